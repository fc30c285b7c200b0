use pc_core::{ImageView, RasterImage, Rect, mean_column_luma};

use crate::TrimConfig;

/// A trimmed panel: its box on the page and an owned copy of its pixels.
#[derive(Debug, Clone)]
pub struct Panel {
    pub rect: Rect,
    pub crop: RasterImage,
}

fn pad_for(extent: usize, cfg: &TrimConfig) -> usize {
    ((cfg.pad_ratio * extent as f64).round() as usize).max(cfg.min_pad)
}

/// Shrinks `rect` on every side by a size-proportional pad, clamped to the
/// page. A box smaller than twice its pad collapses to an empty rectangle.
pub fn pad_inward(rect: Rect, width: usize, height: usize, cfg: &TrimConfig) -> Rect {
    let pad_x = pad_for(rect.w, cfg);
    let pad_y = pad_for(rect.h, cfg);

    let x0 = (rect.x + pad_x).min(width);
    let y0 = (rect.y + pad_y).min(height);
    let x1 = rect.right().saturating_sub(pad_x).min(width).max(x0);
    let y1 = rect.bottom().saturating_sub(pad_y).min(height).max(y0);

    Rect::new(x0, y0, x1 - x0, y1 - y0)
}

/// Peels dark columns (frame remnants) off the left then right side of
/// `rect`, one column per side per iteration. Rows are left alone.
pub fn trim_dark_columns(
    page: &ImageView<'_, [u8; 3]>,
    mut rect: Rect,
    cfg: &TrimConfig,
) -> Rect {
    let is_dark = |r: Rect, x: usize| {
        page.subview_rect(r)
            .ok()
            .and_then(|view| mean_column_luma(&view, x))
            .is_some_and(|mean| mean < cfg.dark_luma)
    };

    for _ in 0..cfg.max_iterations {
        let mut changed = false;

        if rect.w > cfg.min_width && is_dark(rect, 0) {
            rect.x += 1;
            rect.w -= 1;
            changed = true;
        }
        if rect.w > cfg.min_width && is_dark(rect, rect.w - 1) {
            rect.w -= 1;
            changed = true;
        }

        if !changed {
            break;
        }
    }

    rect
}

/// Pads and trims `rect`, then copies the pixels. Returns `None` when
/// nothing is left.
pub fn trim_panel(page: &RasterImage, rect: Rect, cfg: &TrimConfig) -> Option<Panel> {
    let padded = pad_inward(rect, page.width(), page.height(), cfg);
    if padded.is_empty() {
        return None;
    }

    let trimmed = trim_dark_columns(&page.as_view(), padded, cfg);
    let crop = page.crop(trimmed).ok()?;
    Some(Panel {
        rect: trimmed,
        crop,
    })
}

#[cfg(test)]
mod tests {
    use pc_core::{Image, RasterImage, Rect};

    use super::{pad_inward, trim_dark_columns, trim_panel};
    use crate::TrimConfig;

    fn page_with_dark_columns(w: usize, h: usize, dark: &[usize]) -> RasterImage {
        let mut data = vec![[230u8, 230, 230]; w * h];
        for y in 0..h {
            for &x in dark {
                data[y * w + x] = [10, 10, 10];
            }
        }
        Image::from_vec(w, h, data).expect("valid image")
    }

    #[test]
    fn pad_scales_with_box_size() {
        let cfg = TrimConfig::default();
        assert_eq!(
            pad_inward(Rect::new(10, 10, 100, 100), 500, 500, &cfg),
            Rect::new(16, 16, 88, 88)
        );
        // 2% of 1000 is 20, above the 6 pixel floor.
        assert_eq!(
            pad_inward(Rect::new(0, 0, 1000, 400), 1000, 1000, &cfg),
            Rect::new(20, 8, 960, 384)
        );
    }

    #[test]
    fn pad_never_inverts() {
        let cfg = TrimConfig::default();
        let r = pad_inward(Rect::new(50, 50, 10, 8), 200, 200, &cfg);
        assert!(r.is_empty());

        let clipped = pad_inward(Rect::new(90, 90, 40, 40), 100, 100, &cfg);
        assert_eq!(clipped, Rect::new(96, 96, 4, 4));
    }

    #[test]
    fn dark_columns_are_peeled_left_then_right() {
        let page = page_with_dark_columns(60, 20, &[5, 6, 7, 50]);
        let cfg = TrimConfig::default();
        let out = trim_dark_columns(&page.as_view(), Rect::new(5, 0, 46, 20), &cfg);
        assert_eq!(out, Rect::new(8, 0, 42, 20));
    }

    #[test]
    fn trimming_respects_iteration_cap() {
        let dark: Vec<usize> = (0..15).collect();
        let page = page_with_dark_columns(80, 10, &dark);
        let cfg = TrimConfig::default();
        let out = trim_dark_columns(&page.as_view(), Rect::new(0, 0, 80, 10), &cfg);
        assert_eq!(out, Rect::new(10, 0, 70, 10));
    }

    #[test]
    fn trimming_stops_at_min_width() {
        let dark: Vec<usize> = (0..30).collect();
        let page = page_with_dark_columns(30, 10, &dark);
        let cfg = TrimConfig::default();
        let out = trim_dark_columns(&page.as_view(), Rect::new(0, 0, 24, 10), &cfg);
        assert_eq!(out.w, 20);
        assert_eq!(out, Rect::new(2, 0, 20, 10));
    }

    #[test]
    fn trim_panel_copies_pixels() {
        let page = page_with_dark_columns(120, 80, &[10, 11]);
        let panel = trim_panel(&page, Rect::new(4, 4, 100, 60), &TrimConfig::default())
            .expect("non-empty panel");

        assert_eq!(panel.rect, Rect::new(12, 10, 86, 48));
        assert_eq!((panel.crop.width(), panel.crop.height()), (86, 48));
        assert!(panel.crop.data().iter().all(|&px| px == [230, 230, 230]));
    }

    #[test]
    fn dark_rows_are_kept() {
        let (w, h) = (120, 80);
        let mut page = page_with_dark_columns(w, h, &[]);
        for y in [10, 11, 56, 57] {
            page.data_mut()[y * w..(y + 1) * w].fill([10, 10, 10]);
        }
        let cfg = TrimConfig::default();

        let rect = Rect::new(10, 10, 88, 48);
        let out = trim_dark_columns(&page.as_view(), rect, &cfg);
        assert_eq!((out.y, out.h), (rect.y, rect.h));
        assert_eq!(out, rect);

        let panel = trim_panel(&page, Rect::new(4, 4, 100, 60), &cfg).expect("non-empty panel");
        assert_eq!(panel.rect, rect);
        let crop = &panel.crop;
        for y in [0, 1, 46, 47] {
            let row = &crop.data()[y * crop.width()..(y + 1) * crop.width()];
            assert!(row.iter().all(|&px| px == [10, 10, 10]), "row {y}");
        }
    }

    #[test]
    fn tiny_box_yields_nothing() {
        let page = page_with_dark_columns(50, 50, &[]);
        assert!(trim_panel(&page, Rect::new(10, 10, 12, 12), &TrimConfig::default()).is_none());
    }
}
