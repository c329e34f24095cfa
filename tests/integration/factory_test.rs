// Configuration -> factory -> cache wiring

use std::time::Duration;

use filecache::codec::StringCodec;
use filecache::config::{CacheConfig, Config};
use filecache::{CachedValue, FileCache, FileCacheFactory};
use tempfile::TempDir;

#[test]
fn test_config_driven_factory_places_files_with_affixes() {
    let dir = TempDir::new().unwrap();
    let yaml = format!(
        "cache:\n  base_dir: {}\n  filename_prefix: cache_\n  filename_suffix: .bin\n  default_max_age_seconds: 60\n",
        dir.path().display()
    );
    let config = Config::from_yaml_with_env(&yaml).unwrap();
    config.validate().unwrap();

    let factory = FileCacheFactory::from_config(&config.cache);
    let cache: FileCache<String> = factory.create("users/current", StringCodec);

    assert_eq!(cache.path(), dir.path().join("users/cache_current.bin"));
    assert_eq!(cache.max_age(), Duration::from_secs(60));

    cache.set_value(&"alice".to_string()).unwrap();
    assert!(dir.path().join("users/cache_current.bin").is_file());

    // Same name, affixes already present: same file
    let again: FileCache<String> = factory.create("users/cache_current.bin", StringCodec);
    assert_eq!(again.get_value().unwrap(), "alice");
}

#[test]
fn test_builder_variants_share_base_dir() {
    let dir = TempDir::new().unwrap();
    let factory = FileCacheFactory::from_config(&CacheConfig::new(dir.path()));
    let secure = factory.new_builder().filename_suffix(".secret").build().unwrap();

    let plain: FileCache<String> = factory.create("token", StringCodec);
    let hidden: FileCache<String> = secure.create("token", StringCodec);

    assert_eq!(plain.path(), dir.path().join("token"));
    assert_eq!(hidden.path(), dir.path().join("token.secret"));

    let field = CachedValue::shredding(&hidden);
    field.set(Some("s3cr3t".to_string())).unwrap();
    assert_eq!(field.get().unwrap().as_deref(), Some("s3cr3t"));
    field.set(None).unwrap();
    assert!(!hidden.path().exists());
}
