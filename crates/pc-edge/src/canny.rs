//! Binary edge detection at a single scale.
//!
//! Stages: optional 5-tap binomial smoothing (the 5x5 Gaussian), 3x3 Sobel
//! gradients with L1 magnitude `|gx| + |gy|`, non-maximum suppression along
//! the quantized gradient direction, then double-threshold hysteresis.
//!
//! Thresholds are absolute and expressed in L1 Sobel units on 8-bit input, so
//! the defaults (`30` / `150`) do not depend on image content.
//!
//! Suppression breaks ties toward the lower-index neighbour, so a symmetric
//! step produces a one-pixel-wide line instead of a two-pixel ridge.

use pc_core::{Image, ImageView};
use serde::{Deserialize, Serialize};

/// Hysteresis thresholds in L1 Sobel units.
pub const DEFAULT_LOW_THRESH: f32 = 30.0;
pub const DEFAULT_HIGH_THRESH: f32 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothKind {
    None,
    Gaussian5,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CannyConfig {
    pub smooth: SmoothKind,
    pub low_thresh: f32,
    pub high_thresh: f32,
}

impl Default for CannyConfig {
    fn default() -> Self {
        Self {
            smooth: SmoothKind::Gaussian5,
            low_thresh: DEFAULT_LOW_THRESH,
            high_thresh: DEFAULT_HIGH_THRESH,
        }
    }
}

/// Edge detector with reusable scratch buffers.
#[derive(Debug, Clone)]
pub struct CannyDetector {
    tmp: Image<f32>,
    gx: Image<f32>,
    gy: Image<f32>,
    mag: Image<f32>,
    nms: Image<f32>,
    weak: Vec<u8>,
    visited: Vec<u8>,
    stack: Vec<usize>,
}

impl CannyDetector {
    pub fn new() -> Self {
        Self {
            tmp: Image::new_fill(0, 0, 0.0),
            gx: Image::new_fill(0, 0, 0.0),
            gy: Image::new_fill(0, 0, 0.0),
            mag: Image::new_fill(0, 0, 0.0),
            nms: Image::new_fill(0, 0, 0.0),
            weak: Vec::new(),
            visited: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// Returns a mask of the input size with edge pixels set to `255`.
    pub fn detect_u8(&mut self, img: &ImageView<'_, u8>, cfg: &CannyConfig) -> Image<u8> {
        self.ensure_dims(img.width(), img.height());
        copy_u8_to_tmp(img, self.tmp.data_mut(), img.width());
        self.detect_from_tmp(cfg)
    }

    fn ensure_dims(&mut self, w: usize, h: usize) {
        if self.tmp.width() != w || self.tmp.height() != h {
            self.tmp = Image::new_fill(w, h, 0.0);
            self.gx = Image::new_fill(w, h, 0.0);
            self.gy = Image::new_fill(w, h, 0.0);
            self.mag = Image::new_fill(w, h, 0.0);
            self.nms = Image::new_fill(w, h, 0.0);
        }

        let n = w.saturating_mul(h);
        if self.visited.len() != n {
            self.weak = vec![0; n];
            self.visited = vec![0; n];
        }
    }

    fn detect_from_tmp(&mut self, cfg: &CannyConfig) -> Image<u8> {
        let w = self.tmp.width();
        let h = self.tmp.height();
        if w == 0 || h == 0 {
            return Image::new_fill(w, h, 0);
        }

        match cfg.smooth {
            SmoothKind::None => {}
            SmoothKind::Gaussian5 => self.smooth_gaussian5(),
        }

        self.compute_sobel();
        self.non_max_suppression();
        self.hysteresis(cfg);

        self.build_mask()
    }

    fn smooth_gaussian5(&mut self) {
        const K: [f32; 5] = [1.0, 4.0, 6.0, 4.0, 1.0];
        const NORM: f32 = 1.0 / 16.0;

        let w = self.tmp.width();
        let h = self.tmp.height();

        {
            let src = self.tmp.data();
            let dst = self.gx.data_mut();
            for y in 0..h {
                let row = y * w;
                for x in 0..w {
                    let mut s = 0.0f32;
                    for (k, &kv) in K.iter().enumerate() {
                        let xx = clamp_offset(x, k, w);
                        s += kv * src[row + xx];
                    }
                    dst[row + x] = NORM * s;
                }
            }
        }

        {
            let src = self.gx.data();
            let dst = self.tmp.data_mut();
            for y in 0..h {
                for x in 0..w {
                    let mut s = 0.0f32;
                    for (k, &kv) in K.iter().enumerate() {
                        let yy = clamp_offset(y, k, h);
                        s += kv * src[yy * w + x];
                    }
                    dst[y * w + x] = NORM * s;
                }
            }
        }
    }

    fn compute_sobel(&mut self) {
        let w = self.tmp.width();
        let h = self.tmp.height();
        let src = self.tmp.data();

        let (gx_img, gy_img, mag_img) = (&mut self.gx, &mut self.gy, &mut self.mag);
        let gx = gx_img.data_mut();
        let gy = gy_img.data_mut();
        let mag = mag_img.data_mut();

        for y in 0..h {
            let ym1 = y.saturating_sub(1);
            let yp1 = (y + 1).min(h - 1);
            for x in 0..w {
                let xm1 = x.saturating_sub(1);
                let xp1 = (x + 1).min(w - 1);

                let p00 = src[ym1 * w + xm1];
                let p01 = src[ym1 * w + x];
                let p02 = src[ym1 * w + xp1];
                let p10 = src[y * w + xm1];
                let p12 = src[y * w + xp1];
                let p20 = src[yp1 * w + xm1];
                let p21 = src[yp1 * w + x];
                let p22 = src[yp1 * w + xp1];

                let gxx = (p02 + 2.0 * p12 + p22) - (p00 + 2.0 * p10 + p20);
                let gyy = (p20 + 2.0 * p21 + p22) - (p00 + 2.0 * p01 + p02);

                let idx = y * w + x;
                gx[idx] = gxx;
                gy[idx] = gyy;
                mag[idx] = gxx.abs() + gyy.abs();
            }
        }
    }

    fn non_max_suppression(&mut self) {
        let w = self.tmp.width();
        let h = self.tmp.height();
        let gx = self.gx.data();
        let gy = self.gy.data();
        let mag = self.mag.data();
        let nms = self.nms.data_mut();

        nms.fill(0.0);
        if w < 3 || h < 3 {
            return;
        }

        const TAN22_5: f32 = 0.414_213_57;
        const TAN67_5: f32 = 2.414_213_7;

        for y in 1..(h - 1) {
            for x in 1..(w - 1) {
                let idx = y * w + x;
                let m = mag[idx];
                if m <= 0.0 {
                    continue;
                }

                let gxx = gx[idx];
                let gyy = gy[idx];
                let ax = gxx.abs();
                let ay = gyy.abs();

                let (i1, i2) = if ay <= ax * TAN22_5 {
                    (idx - 1, idx + 1)
                } else if ay >= ax * TAN67_5 {
                    (idx - w, idx + w)
                } else if gxx * gyy > 0.0 {
                    (idx - w - 1, idx + w + 1)
                } else {
                    (idx - w + 1, idx + w - 1)
                };

                if m > mag[i1] && m >= mag[i2] {
                    nms[idx] = m;
                }
            }
        }
    }

    fn hysteresis(&mut self, cfg: &CannyConfig) {
        let w = self.tmp.width();
        let h = self.tmp.height();
        let n = w * h;

        self.weak.fill(0);
        self.visited.fill(0);
        self.stack.clear();

        let mut low = cfg.low_thresh;
        let mut high = cfg.high_thresh;
        if high < low {
            core::mem::swap(&mut high, &mut low);
        }

        for idx in 0..n {
            let v = self.nms.data()[idx];
            if v <= 0.0 {
                continue;
            }
            if v > low {
                self.weak[idx] = 1;
            }
            if v > high {
                self.visited[idx] = 1;
                self.stack.push(idx);
            }
        }

        while let Some(idx) = self.stack.pop() {
            let x = idx % w;
            let y = idx / w;

            let y0 = y.saturating_sub(1);
            let y1 = (y + 1).min(h - 1);
            let x0 = x.saturating_sub(1);
            let x1 = (x + 1).min(w - 1);

            for ny in y0..=y1 {
                for nx in x0..=x1 {
                    let nidx = ny * w + nx;
                    if self.visited[nidx] == 0 && self.weak[nidx] != 0 {
                        self.visited[nidx] = 1;
                        self.stack.push(nidx);
                    }
                }
            }
        }
    }

    fn build_mask(&self) -> Image<u8> {
        let w = self.tmp.width();
        let h = self.tmp.height();
        let mut mask = Image::new_fill(w, h, 0u8);
        for (dst, &v) in mask.data_mut().iter_mut().zip(&self.visited) {
            if v != 0 {
                *dst = 255;
            }
        }
        mask
    }
}

impl Default for CannyDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot detection without keeping scratch buffers around.
pub fn canny_u8(img: &ImageView<'_, u8>, cfg: &CannyConfig) -> Image<u8> {
    CannyDetector::new().detect_u8(img, cfg)
}

#[inline]
fn clamp_offset(i: usize, k: usize, len: usize) -> usize {
    // `k` indexes a 5-tap kernel centred at 2.
    (i + k).saturating_sub(2).min(len - 1)
}

fn copy_u8_to_tmp(src: &ImageView<'_, u8>, dst: &mut [f32], dst_w: usize) {
    for y in 0..src.height() {
        let s = src.row(y);
        let d = &mut dst[y * dst_w..(y + 1) * dst_w];
        for (dv, &sv) in d.iter_mut().zip(s.iter()) {
            *dv = sv as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use pc_core::Image;

    use crate::canny::{CannyConfig, CannyDetector, SmoothKind, canny_u8};

    fn vertical_step(w: usize, h: usize, edge_x: usize, lo: u8, hi: u8) -> Image<u8> {
        let mut data = vec![lo; w * h];
        for y in 0..h {
            for x in edge_x..w {
                data[y * w + x] = hi;
            }
        }
        Image::from_vec(w, h, data).expect("valid image")
    }

    #[test]
    fn vertical_step_gives_single_pixel_line() {
        let (w, h) = (64usize, 48usize);
        let img = vertical_step(w, h, 32, 0, 200);

        let mask = canny_u8(&img.as_view(), &CannyConfig::default());
        for y in 1..(h - 1) {
            let row = &mask.data()[y * w..(y + 1) * w];
            let set: Vec<usize> = (0..w).filter(|&x| row[x] != 0).collect();
            assert_eq!(set, vec![31], "row {y}");
        }
    }

    #[test]
    fn flat_image_has_no_edges() {
        let img = Image::new_fill(40, 30, 180u8);
        let mask = canny_u8(&img.as_view(), &CannyConfig::default());
        assert_eq!(mask.count_set(), 0);
    }

    #[test]
    fn weak_step_stays_below_high_threshold() {
        let img = vertical_step(48, 32, 24, 100, 110);
        let mask = canny_u8(&img.as_view(), &CannyConfig::default());
        assert_eq!(mask.count_set(), 0);
    }

    #[test]
    fn threshold_levels_affect_edge_count() {
        let img = vertical_step(64, 48, 20, 0, 255);
        let mut det = CannyDetector::new();

        let lo = det.detect_u8(&img.as_view(), &CannyConfig::default()).count_set();
        let hi = det
            .detect_u8(
                &img.as_view(),
                &CannyConfig {
                    low_thresh: 1.0e9,
                    high_thresh: 1.0e9,
                    ..CannyConfig::default()
                },
            )
            .count_set();

        assert!(lo > 0);
        assert_eq!(hi, 0);
    }

    #[test]
    fn smoothing_can_be_disabled() {
        let img = vertical_step(32, 16, 16, 0, 255);
        let cfg = CannyConfig {
            smooth: SmoothKind::None,
            ..CannyConfig::default()
        };

        let mask = canny_u8(&img.as_view(), &cfg);
        assert!(mask.count_set() > 0);
        assert_eq!(mask.width(), 32);
        assert_eq!(mask.height(), 16);
    }
}
