use std::path::Path;

use super::*;
use crate::foundation::color::PadColor;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_compose_pipeline").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_pages(dir: &Path, count: u8) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("page-{i}.png"));
            RgbaImage::from_pixel(8, 4, image::Rgba([i * 20, 0, 0, 255]))
                .save(&path)
                .unwrap();
            path
        })
        .collect()
}

fn spec() -> CanvasSpec {
    CanvasSpec::new(8, 8, PadColor::BLACK).unwrap()
}

#[test]
fn sequential_and_parallel_agree_on_order_and_pixels() {
    let dir = scratch("agree");
    let pages = write_pages(&dir, 6);

    let seq = composite_pages(&pages, &spec(), &CompositeThreading::default()).unwrap();
    let par = composite_pages(
        &pages,
        &spec(),
        &CompositeThreading {
            parallel: true,
            threads: Some(3),
        },
    )
    .unwrap();

    assert_eq!(seq.len(), 6);
    for (i, (a, b)) in seq.iter().zip(&par).enumerate() {
        assert_eq!(a.as_raw(), b.as_raw(), "page {i}");
        // Center row carries the page's own red level.
        assert_eq!(a.get_pixel(4, 4).0[0], (i as u8) * 20);
    }
}

#[test]
fn first_bad_page_fails_the_batch() {
    let dir = scratch("bad");
    let mut pages = write_pages(&dir, 2);
    let broken = dir.join("page-9.png");
    std::fs::write(&broken, b"not a png").unwrap();
    pages.push(broken);

    for parallel in [false, true] {
        let err = composite_pages(
            &pages,
            &spec(),
            &CompositeThreading {
                parallel,
                threads: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, SlideError::InvalidImage(_)));
    }
}

#[test]
fn zero_threads_is_rejected() {
    let err = composite_pages(
        &[],
        &spec(),
        &CompositeThreading {
            parallel: true,
            threads: Some(0),
        },
    )
    .unwrap_err();
    assert!(matches!(err, SlideError::Validation(_)));
}
