use std::{cell::RefCell, io::Cursor};

use super::*;
use crate::{Size, assets::source::MemorySource};

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

type Slot = Rc<RefCell<Option<RopelineResult<JsonAsset>>>>;

fn slot() -> (Slot, impl FnOnce(RopelineResult<JsonAsset>) + 'static) {
    let slot: Slot = Rc::new(RefCell::new(None));
    let s = slot.clone();
    (slot, move |res| {
        assert!(s.borrow().is_none(), "done called twice");
        *s.borrow_mut() = Some(res);
    })
}

const SHEET: &str = r#"{
  "frames": {
    "rope": {"frame": {"x": 0, "y": 0, "w": 16, "h": 8}},
    "knot": {"frame": {"x": 16, "y": 0, "w": 8, "h": 8}, "trimmed": true,
             "spriteSourceSize": {"x": 1, "y": 1, "w": 8, "h": 8}, "sourceSize": {"w": 10, "h": 10}}
  },
  "meta": {"image": "sheet.png"}
}"#;

#[test]
fn sprite_sheet_registers_frames_then_completes_after_image() {
    let src = MemorySource::new()
        .with("gfx/sheet.json", SHEET)
        .unwrap()
        .with("gfx/sheet.png", png(32, 8))
        .unwrap();
    let mut loader = AssetLoader::new(src);
    let mut caches = AssetCaches::new();
    let (result, done) = slot();

    loader.load_json("gfx/sheet.json", done).unwrap();
    assert_eq!(loader.pending(), 1);

    assert!(loader.poll(&mut caches));
    assert!(result.borrow().is_none());
    let rope = caches.textures.get("rope").unwrap().clone();
    assert_eq!(rope.height(), Some(8.0));
    assert!(!rope.is_valid());

    assert_eq!(loader.run_until_idle(&mut caches), 1);
    let JsonAsset::SpriteSheet { url, frames, base } = result.borrow_mut().take().unwrap().unwrap()
    else {
        panic!("expected sprite sheet");
    };
    assert_eq!(url, "gfx/sheet.json");
    assert_eq!(frames, vec!["knot".to_string(), "rope".to_string()]);
    assert_eq!(base.size(), Some(Size::new(32.0, 8.0)));
    assert_eq!(rope.uvs().unwrap().x1, 0.5);
    assert_eq!(
        caches.textures.get("knot").unwrap().logical_size(),
        Some(Size::new(10.0, 10.0))
    );
    assert!(caches.base_texture("gfx/sheet.png").is_some());
}

#[test]
fn sheet_with_missing_image_fails_and_marks_base() {
    let src = MemorySource::new().with("sheet.json", SHEET).unwrap();
    let mut loader = AssetLoader::new(src);
    let mut caches = AssetCaches::new();
    let (result, done) = slot();

    loader.load_json("sheet.json", done).unwrap();
    loader.run_until_idle(&mut caches);

    let err = result.borrow_mut().take().unwrap().unwrap_err();
    assert!(err.to_string().contains("sheet.png"));
    let base = caches.base_texture("sheet.png").unwrap();
    assert!(matches!(base.status(), BaseTextureStatus::Failed(_)));
    assert!(!caches.textures.get("rope").unwrap().is_valid());
}

#[test]
fn sheet_without_meta_image_is_rejected() {
    let src = MemorySource::new()
        .with("s.json", r#"{"frames": {}}"#)
        .unwrap();
    let mut loader = AssetLoader::new(src);
    let mut caches = AssetCaches::new();
    let (result, done) = slot();
    loader.load_json("s.json", done).unwrap();
    loader.run_until_idle(&mut caches);
    let err = result.borrow_mut().take().unwrap().unwrap_err();
    assert!(err.to_string().contains("meta.image"));
}

const ATLAS: &str = "
boy.png
size: 16,8
head
  xy: 0, 0
  size: 8, 8
tail
  xy: 8, 0
  size: 8, 8
";

#[test]
fn skeleton_chains_atlas_before_completing() {
    let src = MemorySource::new()
        .with("spine/boy.json", r#"{"bones": [{"name": "root"}]}"#)
        .unwrap()
        .with("spine/boy.atlas", ATLAS)
        .unwrap()
        .with("spine/boy.png", png(16, 8))
        .unwrap();
    let mut loader = AssetLoader::new(src);
    let mut caches = AssetCaches::new();
    let (result, done) = slot();

    loader.load_json("spine/boy.json", done).unwrap();
    loader.poll(&mut caches);
    assert!(result.borrow().is_none());
    assert!(!caches.animations.contains("spine/boy.json"));

    loader.poll(&mut caches);
    let JsonAsset::Skeleton {
        atlas_url, regions, ..
    } = result.borrow_mut().take().unwrap().unwrap()
    else {
        panic!("expected skeleton");
    };
    assert_eq!(atlas_url, "spine/boy.atlas");
    assert_eq!(regions, vec!["head".to_string(), "tail".to_string()]);
    assert!(caches.animations.contains("spine/boy.json"));

    // Page image follows as its own job.
    let head = caches.textures.get("head").unwrap().clone();
    assert!(!head.is_valid());
    assert_eq!(loader.run_until_idle(&mut caches), 1);
    assert_eq!(head.uvs().unwrap().x1, 0.5);
}

#[test]
fn skeleton_without_atlas_fails() {
    let src = MemorySource::new()
        .with("boy.json", r#"{"bones": []}"#)
        .unwrap();
    let mut loader = AssetLoader::new(src);
    let mut caches = AssetCaches::new();
    let (result, done) = slot();
    loader.load_json("boy.json", done).unwrap();
    loader.run_until_idle(&mut caches);

    let err = result.borrow_mut().take().unwrap().unwrap_err();
    assert!(err.to_string().contains("boy.atlas"));
    assert!(caches.animations.is_empty());
}

#[test]
fn plain_json_completes_as_data() {
    let src = MemorySource::new()
        .with("cfg.json", r#"{"speed": 3}"#)
        .unwrap();
    let mut loader = AssetLoader::new(src);
    let mut caches = AssetCaches::new();
    let (result, done) = slot();
    loader.load_json("./cfg.json", done).unwrap();
    assert_eq!(loader.run_until_idle(&mut caches), 1);

    let JsonAsset::Data { url, value } = result.borrow_mut().take().unwrap().unwrap() else {
        panic!("expected data");
    };
    assert_eq!(url, "cfg.json");
    assert_eq!(value["speed"], 3);
}

#[test]
fn missing_or_malformed_json_reports_error() {
    let src = MemorySource::new().with("bad.json", "{").unwrap();
    let mut loader = AssetLoader::new(src);
    let mut caches = AssetCaches::new();

    let (missing, done) = slot();
    loader.load_json("nope.json", done).unwrap();
    let (bad, done) = slot();
    loader.load_json("bad.json", done).unwrap();
    loader.run_until_idle(&mut caches);

    assert!(missing.borrow_mut().take().unwrap().is_err());
    let err = bad.borrow_mut().take().unwrap().unwrap_err();
    assert!(err.to_string().contains("load json 'bad.json'"));
}

#[test]
fn invalid_url_is_rejected_without_queueing() {
    let mut loader = AssetLoader::new(MemorySource::new());
    assert!(loader.load_json("../x.json", |_| {}).is_err());
    assert!(loader.is_idle());
}

#[test]
fn load_image_shares_base_and_fetch() {
    let src = MemorySource::new().with("a.png", png(4, 2)).unwrap();
    let mut loader = AssetLoader::new(src);
    let mut caches = AssetCaches::new();

    let a = loader.load_image("a.png", &mut caches).unwrap();
    let b = loader.load_image("./a.png", &mut caches).unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(loader.pending(), 1);
    assert!(!a.is_ready());

    loader.run_until_idle(&mut caches);
    assert_eq!(a.size(), Some(Size::new(4.0, 2.0)));
    assert!(a.pixels().is_some());

    let missing = loader.load_image("b.png", &mut caches).unwrap();
    loader.run_until_idle(&mut caches);
    assert!(matches!(missing.status(), BaseTextureStatus::Failed(_)));
    assert!(!loader.poll(&mut caches));
}
