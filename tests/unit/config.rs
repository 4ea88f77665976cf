use std::io::Cursor;

use super::*;
use crate::{RefreshOutcome, assets::source::MemorySource};

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([0, 0, 255, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn parse(json: &str) -> RopelineResult<RopeConfig> {
    RopeConfig::from_reader(json.as_bytes())
}

#[test]
fn texture_spec_variants_parse() {
    let cfg = parse(r#"{"points": [[0, 0]], "texture": {"size": {"width": 4, "height": 10}}}"#)
        .unwrap();
    assert!(cfg.auto_update);
    assert_eq!(
        cfg.texture,
        TextureSource::Size {
            size: PixelSize {
                width: 4.0,
                height: 10.0
            }
        }
    );

    let cfg = parse(
        r#"{"points": [], "texture": {"sheet": "a.json", "frame": "rope"}, "auto_update": false}"#,
    )
    .unwrap();
    assert!(!cfg.auto_update);
    assert!(matches!(cfg.texture, TextureSource::SheetFrame { .. }));

    let cfg = parse(r#"{"points": [], "texture": {"image": "rope.png"}}"#).unwrap();
    assert!(matches!(cfg.texture, TextureSource::Image { .. }));
}

#[test]
fn validation_rejects_bad_values() {
    assert!(parse(r#"{"points": [], "texture": {"size": {"width": 0, "height": 1}}}"#).is_err());
    assert!(parse(r#"{"points": [], "texture": {"image": "/abs.png"}}"#).is_err());
    assert!(parse(r#"{"points": [], "texture": {"sheet": "../a.json", "frame": "x"}}"#).is_err());
    assert!(parse(r#"{"points": [], "texture": {"sheet": "a.json", "frame": ""}}"#).is_err());
    assert!(parse(r#"{"points": [], "texture": {"nothing": 1}}"#).is_err());

    let cfg = RopeConfig {
        points: vec![[0.0, f64::NAN]],
        texture: TextureSource::Image {
            image: "a.png".to_string(),
        },
        auto_update: true,
    };
    assert!(cfg.validate().unwrap_err().to_string().contains("points[0]"));
}

#[test]
fn build_from_size_needs_no_assets() {
    let cfg = parse(
        r#"{"points": [[0, 0], [10, 0], [20, 0]], "texture": {"size": {"width": 8, "height": 10}}}"#,
    )
    .unwrap();
    let mut loader = AssetLoader::new(MemorySource::new());
    let mut caches = AssetCaches::new();
    let (rope, path) = cfg.build(&mut loader, &mut caches).unwrap();

    assert_eq!(path.len(), 3);
    assert!(!rope.is_stale(&path));
    assert_eq!(
        rope.buffers().vertices().as_slice(),
        &[0.0, -5.0, 0.0, 5.0, 10.0, -5.0, 10.0, 5.0, 20.0, -5.0, 20.0, 5.0]
    );
}

#[test]
fn build_from_sheet_frame_loads_sheet_and_image() {
    let src = MemorySource::new()
        .with(
            "ropes.json",
            r#"{"frames": {"rope": {"frame": {"x": 0, "y": 0, "w": 32, "h": 4}}}, "meta": {"image": "ropes.png"}}"#,
        )
        .unwrap()
        .with("ropes.png", png(64, 4))
        .unwrap();
    let cfg = parse(
        r#"{"points": [[0, 0], [5, 0]], "texture": {"sheet": "ropes.json", "frame": "rope"}, "auto_update": false}"#,
    )
    .unwrap();
    let mut loader = AssetLoader::new(src);
    let mut caches = AssetCaches::new();
    let (mut rope, path) = cfg.build(&mut loader, &mut caches).unwrap();

    assert!(!rope.auto_update);
    assert_eq!(rope.buffers().uvs().as_slice(), &[0.0, 0.0, 0.0, 1.0, 0.5, 0.0, 0.5, 1.0]);
    assert_eq!(rope.full_refresh(&path), RefreshOutcome::Rebuilt);
}

#[test]
fn build_reports_missing_frame_and_image() {
    let src = MemorySource::new()
        .with(
            "ropes.json",
            r#"{"frames": {"rope": {"frame": {"x": 0, "y": 0, "w": 1, "h": 1}}}, "meta": {"image": "ropes.png"}}"#,
        )
        .unwrap()
        .with("ropes.png", png(1, 1))
        .unwrap();
    let mut loader = AssetLoader::new(src);
    let mut caches = AssetCaches::new();

    let cfg = parse(r#"{"points": [], "texture": {"sheet": "ropes.json", "frame": "knot"}}"#).unwrap();
    let err = cfg.build(&mut loader, &mut caches).unwrap_err();
    assert!(err.to_string().contains("unknown texture 'knot'"));

    let cfg = parse(r#"{"points": [], "texture": {"image": "gone.png"}}"#).unwrap();
    assert!(cfg.build(&mut loader, &mut caches).is_err());
}

#[test]
fn loader_options_default_to_current_dir() {
    let opts: LoaderOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(opts, LoaderOptions::default());
    assert_eq!(opts.source().root(), Path::new("."));
}
