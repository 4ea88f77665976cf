use super::*;

#[test]
fn animation_cache_round_trip() {
    let mut cache = AnimationCache::new();
    assert!(cache.is_empty());
    cache.insert("spine/boy.json", serde_json::json!({"bones": []}));
    assert!(cache.contains("spine/boy.json"));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("spine/boy.json").unwrap()["bones"], serde_json::json!([]));
}

#[test]
fn base_textures_are_shared_per_path() {
    let mut caches = AssetCaches::new();
    let (a, created_a) = caches.base_texture_or_pending("img/a.png");
    let (b, created_b) = caches.base_texture_or_pending("img/a.png");
    assert!(created_a);
    assert!(!created_b);
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(caches.base_texture_count(), 1);
    assert!(caches.base_texture("img/a.png").is_some());
    assert!(caches.base_texture("img/b.png").is_none());
}
