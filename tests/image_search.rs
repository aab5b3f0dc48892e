//! Bundled matcher integration tests
//!
//! Runs the real worker script. Needs python3 with OpenCV and NumPy.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sightline::core::config::MatcherConfig;
use sightline::matcher::{MatchRequest, MatcherWorker, TemplateMatcher};

/// Seeded black and white noise so every template position is unique
fn noise(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |_, _| {
        let v = if rng.random_bool(0.5) { 255 } else { 0 };
        Rgb([v, v, v])
    })
}

fn png(img: &RgbImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn worker() -> MatcherWorker {
    MatcherWorker::new(MatcherConfig::default())
}

#[tokio::test]
#[ignore] // Requires python3 with cv2 and numpy
async fn test_template_matches_itself_at_its_center() {
    let template = png(&noise(98, 38, 7));
    let worker = worker();

    let matches = worker
        .find_matches(MatchRequest::new(&template, &template, 0.9))
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    let found = matches.get(0).unwrap();
    assert_eq!(found.point.x, 49.0);
    assert_eq!(found.point.y, 19.0);
    assert!(found.confidence > 0.99);

    worker.shutdown().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires python3 with cv2 and numpy
async fn test_pasted_template_is_found_in_screenshot() {
    let tpl = noise(60, 40, 3);
    let mut screenshot = RgbImage::from_pixel(400, 300, Rgb([255, 255, 255]));
    image::imageops::replace(&mut screenshot, &tpl, 200, 150);

    let worker = worker();
    let matches = worker
        .find_matches(MatchRequest::new(&png(&screenshot), &png(&tpl), 0.8))
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    let found = matches.get(0).unwrap();
    assert!((found.point.x - 230.0).abs() <= 1.0);
    assert!((found.point.y - 170.0).abs() <= 1.0);

    worker.shutdown().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires python3 with cv2 and numpy
async fn test_raising_threshold_never_adds_matches() {
    let tpl = noise(40, 40, 11);
    let mut screenshot = noise(320, 240, 5);
    image::imageops::replace(&mut screenshot, &tpl, 20, 20);
    image::imageops::replace(&mut screenshot, &tpl, 200, 120);

    let worker = worker();
    let screenshot = png(&screenshot);
    let tpl = png(&tpl);

    let mut previous = usize::MAX;
    for threshold in [0.5, 0.7, 0.9, 0.99] {
        let count = worker
            .find_matches(MatchRequest::new(&screenshot, &tpl, threshold))
            .await
            .unwrap()
            .len();
        assert!(count <= previous, "threshold {} found more", threshold);
        previous = count;
    }
    assert_eq!(previous, 2);

    worker.shutdown().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires python3 with cv2 and numpy
async fn test_edge_mode_finds_outline() {
    let mut tpl = RgbImage::from_pixel(50, 50, Rgb([255, 255, 255]));
    for i in 10..40 {
        for j in [10, 11, 38, 39] {
            tpl.put_pixel(i, j, Rgb([0, 0, 0]));
            tpl.put_pixel(j, i, Rgb([0, 0, 0]));
        }
    }
    let mut screenshot = RgbImage::from_pixel(300, 200, Rgb([255, 255, 255]));
    image::imageops::replace(&mut screenshot, &tpl, 100, 80);

    let worker = worker();
    let matches = worker
        .find_matches(MatchRequest::new(&png(&screenshot), &png(&tpl), 0.8).with_edge_mode(true))
        .await
        .unwrap();

    assert!(!matches.is_empty());
    let found = matches.get(0).unwrap();
    assert!((found.point.x - 125.0).abs() <= 2.0);
    assert!((found.point.y - 105.0).abs() <= 2.0);

    worker.shutdown().await.unwrap();
}
