use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pc_core::Image;
use pc_edge::{CannyConfig, CannyDetector};

fn build_grid_u8(width: usize, height: usize) -> Image<u8> {
    let gutter = 16;
    let mut data = vec![235u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let in_frame = x < gutter
                || y < gutter
                || x >= width - gutter
                || y >= height - gutter
                || x.abs_diff(width / 2) < gutter / 2
                || y.abs_diff(height / 2) < gutter / 2;
            if in_frame {
                data[y * width + x] = 0;
            }
        }
    }

    Image::from_vec(width, height, data).expect("valid image")
}

fn bench_canny_u8(c: &mut Criterion) {
    let img = build_grid_u8(1280, 1024);
    let view = img.as_view();
    let cfg = CannyConfig::default();
    let mut det = CannyDetector::new();

    c.bench_function("canny_detect_u8_1280x1024", |b| {
        b.iter(|| {
            let out = det.detect_u8(black_box(&view), black_box(&cfg));
            black_box(out.count_set());
        });
    });
}

criterion_group!(benches, bench_canny_u8);
criterion_main!(benches);
