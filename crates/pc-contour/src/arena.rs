use pc_core::Rect;
use serde::Serialize;

pub type ContourId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderKind {
    /// Boundary between a component and the background surrounding it.
    Outer,
    /// Boundary between a component and a background region it encloses.
    Hole,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContourNode {
    pub id: ContourId,
    pub kind: BorderKind,
    /// Traced boundary pixels `(x, y)` in following order.
    pub points: Vec<(usize, usize)>,
    pub bbox: Rect,
    pub parent: Option<ContourId>,
    pub first_child: Option<ContourId>,
    pub next_sibling: Option<ContourId>,
}

impl ContourNode {
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }
}

/// Flat storage of traced contours; relations are indices into `nodes`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContourArena {
    pub width: usize,
    pub height: usize,
    pub nodes: Vec<ContourNode>,
}

impl ContourArena {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: ContourId) -> Option<&ContourNode> {
        self.nodes.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContourNode> {
        self.nodes.iter()
    }

    pub fn roots(&self) -> impl Iterator<Item = &ContourNode> {
        self.nodes.iter().filter(|n| n.parent.is_none())
    }

    pub fn num_holes(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.kind == BorderKind::Hole)
            .count()
    }

    /// Walks `first_child` then `next_sibling` links of `id`.
    pub fn children(&self, id: ContourId) -> Children<'_> {
        Children {
            arena: self,
            next: self.nodes.get(id).and_then(|n| n.first_child),
        }
    }

    /// Fills `first_child` / `next_sibling` from `parent`, keeping siblings in
    /// discovery order.
    pub(crate) fn link_children(&mut self) {
        let mut last_child: Vec<Option<ContourId>> = vec![None; self.nodes.len()];
        for id in 0..self.nodes.len() {
            self.nodes[id].first_child = None;
            self.nodes[id].next_sibling = None;
        }

        for id in 0..self.nodes.len() {
            let Some(parent) = self.nodes[id].parent else {
                continue;
            };

            match last_child[parent] {
                Some(prev) => self.nodes[prev].next_sibling = Some(id),
                None => self.nodes[parent].first_child = Some(id),
            }
            last_child[parent] = Some(id);
        }
    }
}

pub struct Children<'a> {
    arena: &'a ContourArena,
    next: Option<ContourId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a ContourNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.arena.nodes.get(self.next?)?;
        self.next = node.next_sibling;
        Some(node)
    }
}
