use safewrite::config::CacheConfig;
use safewrite::{CachePathDeriver, CacheStore, WriteSerializer};
use tempfile::TempDir;

#[tokio::test]
async fn hard_link_and_original_share_cache_path() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("story.json");
    let alias = temp.path().join("alias.json");
    let other = temp.path().join("other.json");
    std::fs::write(&source, "{}").unwrap();
    std::fs::write(&other, "{}").unwrap();
    std::fs::hard_link(&source, &alias).unwrap();

    let deriver = CachePathDeriver::new(temp.path().join("cache"));
    let (a, _) = deriver.cache_path_for(&source).await.unwrap();
    let (b, _) = deriver.cache_path_for(&alias).await.unwrap();
    let (c, _) = deriver.cache_path_for(&other).await.unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.starts_with(temp.path().join("cache")));
    assert_eq!(a.extension().unwrap(), "cache");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cache_store_from_config_round_trips() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("story.json");
    std::fs::write(&source, "{\"start\":1}").unwrap();
    let config = CacheConfig {
        dir: Some(temp.path().join("cache")),
        fingerprint: true,
    };
    let cache = CacheStore::from_config(&config, WriteSerializer::new()).unwrap();

    let id = cache.write_cache(&source, vec![1u8, 2, 3]).await.unwrap();
    let cache_file = cache.deriver().cache_path_for_identity(&id);
    assert_eq!(std::fs::read(&cache_file).unwrap(), vec![1u8, 2, 3]);
    assert_eq!(
        cache.read_cache(&source).await.unwrap(),
        Some(vec![1u8, 2, 3])
    );

    cache.write_cache(&source, vec![4u8]).await.unwrap();
    assert_eq!(cache.read_cache(&source).await.unwrap(), Some(vec![4u8]));
}
