use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use panelcut::{EncodeOptions, Rect, SegmentError, Segmenter, segment_panels};

const PAGE: u32 = 400;
const FRAME: u32 = 10;
const GUTTER: u32 = 20;

const TL: [u8; 3] = [240, 120, 120];
const TR: [u8; 3] = [120, 220, 120];
const BL: [u8; 3] = [120, 160, 240];
const BR: [u8; 3] = [240, 220, 110];

/// 2x2 page: black outer frame, black cross gutter, one flat colour per
/// quadrant.
fn grid_page() -> RgbImage {
    let mid_lo = PAGE / 2 - GUTTER / 2;
    let mid_hi = PAGE / 2 + GUTTER / 2;

    RgbImage::from_fn(PAGE, PAGE, |x, y| {
        let border = x < FRAME || y < FRAME || x >= PAGE - FRAME || y >= PAGE - FRAME;
        let gutter = (mid_lo..mid_hi).contains(&x) || (mid_lo..mid_hi).contains(&y);
        if border || gutter {
            return Rgb([0, 0, 0]);
        }

        match (x < mid_lo, y < mid_lo) {
            (true, true) => Rgb(TL),
            (false, true) => Rgb(TR),
            (true, false) => Rgb(BL),
            (false, false) => Rgb(BR),
        }
    })
}

fn png_bytes(img: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("png encode");
    bytes
}

fn centre_pixel(encoded: &[u8]) -> [u8; 3] {
    let img = image::load_from_memory(encoded).expect("decodable panel").to_rgb8();
    img.get_pixel(img.width() / 2, img.height() / 2).0
}

#[test]
fn grid_page_yields_four_panels_in_reading_order() {
    let panels = segment_panels(&png_bytes(&grid_page()), "png", 80).expect("valid page");

    assert_eq!(panels.len(), 4);
    let colours: Vec<[u8; 3]> = panels.iter().map(|p| centre_pixel(p)).collect();
    assert_eq!(colours, vec![TL, TR, BL, BR]);
}

#[test]
fn detected_boxes_stay_inside_their_quadrants() {
    let page = panelcut::decode_raster(&png_bytes(&grid_page())).expect("valid page");
    let boxes = Segmenter::default().detect(&page);
    assert_eq!(boxes.len(), 4);

    let mid = (PAGE / 2) as usize;
    let quadrants = [
        Rect::new(0, 0, mid, mid),
        Rect::new(mid, 0, mid, mid),
        Rect::new(0, mid, mid, mid),
        Rect::new(mid, mid, mid, mid),
    ];
    for (b, q) in boxes.iter().zip(quadrants.iter()) {
        assert_eq!(b.intersection(q), Some(*b), "{b:?} outside {q:?}");
        assert!(b.area() * 4 > q.area() * 3, "{b:?} too small");
    }
}

#[test]
fn blank_page_is_not_an_error() {
    let blank = RgbImage::from_pixel(300, 200, Rgb([255, 255, 255]));
    let panels = segment_panels(&png_bytes(&blank), "webp", 80).expect("valid page");
    assert!(panels.is_empty());
}

#[test]
fn undecodable_input_is_rejected() {
    let err = segment_panels(&[0x00, 0x01, 0x02, 0x03], "webp", 80).expect_err("garbage");
    assert!(matches!(err, SegmentError::Decode(_)));
    assert!(err.is_invalid_input());
}

#[test]
fn unknown_format_is_rejected() {
    let err = segment_panels(&png_bytes(&grid_page()), "bmp", 80).expect_err("bad format");
    assert!(matches!(err, SegmentError::UnsupportedFormat(_)));
    assert!(err.is_invalid_input());
}

#[test]
fn quality_outside_range_is_clamped() {
    let bytes = png_bytes(&grid_page());

    let low = segment_panels(&bytes, "jpeg", -5).expect("valid page");
    let min = segment_panels(&bytes, "jpeg", 1).expect("valid page");
    assert_eq!(low, min);

    let high = segment_panels(&bytes, "webp", 500).expect("valid page");
    let max = segment_panels(&bytes, "webp", 100).expect("valid page");
    assert_eq!(high, max);
    assert_eq!(high.len(), 4);
}

#[test]
fn jpg_alias_matches_jpeg() {
    let bytes = png_bytes(&grid_page());
    let jpg = segment_panels(&bytes, "JPG", 75).expect("valid page");
    let jpeg = segment_panels(&bytes, "jpeg", 75).expect("valid page");

    assert_eq!(jpg.len(), 4);
    assert_eq!(jpg, jpeg);
    assert!(jpg.iter().all(|p| p.starts_with(&[0xFF, 0xD8])));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let bytes = png_bytes(&grid_page());
    let first = segment_panels(&bytes, "webp", 80).expect("valid page");
    let second = segment_panels(&bytes, "webp", 80).expect("valid page");
    assert_eq!(first, second);
}

#[test]
fn nested_inset_is_suppressed() {
    // A dark box drawn inside the top-left panel is a plausible candidate on
    // its own, but lies entirely within the panel around it.
    let mut page = grid_page();
    for y in 50..150 {
        for x in 50..150 {
            page.put_pixel(x, y, Rgb([20, 20, 20]));
        }
    }
    let raster = panelcut::decode_raster(&png_bytes(&page)).expect("valid page");
    let boxes = Segmenter::default().detect(&raster);

    assert_eq!(boxes.len(), 4);
    for (i, a) in boxes.iter().enumerate() {
        for b in &boxes[i + 1..] {
            let overlap = a.intersection_area(b) as f64;
            assert!(overlap <= 0.30 * a.area().min(b.area()) as f64);
        }
    }
    assert!(boxes[0].w > 150 && boxes[0].h > 150);
}

#[test]
fn png_round_trip_matches_trimmed_boxes() {
    let bytes = png_bytes(&grid_page());
    let opts = EncodeOptions::parse("png", 80).expect("valid options");
    let outcomes = Segmenter::default()
        .segment(&bytes, &opts)
        .expect("valid page");

    assert_eq!(outcomes.len(), 4);
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.index, i);
        let encoded = outcome.result.as_ref().expect("encoded panel");
        let decoded = image::load_from_memory(encoded).expect("decodable").to_rgb8();
        assert_eq!(
            decoded.dimensions(),
            (outcome.rect.w as u32, outcome.rect.h as u32)
        );
    }
}
