// Presence rules: length, max age, touch

use std::fs::File;
use std::time::Duration;

use chrono::{SubsecRound, Utc};
use filecache::codec::StringCodec;
use filecache::{FileCache, WriteTime};
use tempfile::TempDir;

fn aged_cache(dir: &TempDir, max_age: Duration) -> FileCache<String> {
    FileCache::with_max_age(dir.path().join("entry"), StringCodec, max_age)
}

#[test]
fn test_entry_older_than_max_age_is_absent() {
    let dir = TempDir::new().unwrap();
    let cache = aged_cache(&dir, Duration::from_secs(20));

    cache
        .set_value_at(&"v".to_string(), Utc::now() - chrono::Duration::seconds(30))
        .unwrap();

    assert!(cache.path().exists());
    assert!(!cache.is_present().unwrap());
    assert_eq!(cache.get_value_or_absent().unwrap(), None);
    assert_eq!(cache.get_modification_time_or_absent().unwrap(), None);
}

#[test]
fn test_expired_entry_counts_as_absent_for_updates() {
    let dir = TempDir::new().unwrap();
    let cache = aged_cache(&dir, Duration::from_secs(20));
    cache
        .set_value_at(&"stale".to_string(), Utc::now() - chrono::Duration::minutes(5))
        .unwrap();

    let mut seen = Some("sentinel".to_string());
    cache
        .update_value(|value| {
            seen = value;
            Some("fresh".to_string())
        })
        .unwrap();

    assert_eq!(seen, None);
    assert_eq!(cache.get_value().unwrap(), "fresh");
}

#[test]
fn test_preserve_on_expired_entry_restamps_now() {
    let dir = TempDir::new().unwrap();
    let cache = aged_cache(&dir, Duration::from_secs(20));
    cache
        .set_value_at(&"stale".to_string(), Utc::now() - chrono::Duration::minutes(5))
        .unwrap();

    cache
        .set_value_at(&"again".to_string(), WriteTime::Preserve)
        .unwrap();

    assert_eq!(cache.get_value().unwrap(), "again");
}

#[test]
fn test_zero_max_age_never_expires() {
    let dir = TempDir::new().unwrap();
    let cache = aged_cache(&dir, Duration::ZERO);

    cache
        .set_value_at(&"ancient".to_string(), Utc::now() - chrono::Duration::days(3650))
        .unwrap();

    assert!(cache.is_present().unwrap());
}

#[test]
fn test_touch_refreshes_expired_entry() {
    let dir = TempDir::new().unwrap();
    let cache = aged_cache(&dir, Duration::from_secs(20));
    cache
        .set_value_at(&"kept".to_string(), Utc::now() - chrono::Duration::seconds(60))
        .unwrap();
    assert!(!cache.is_present().unwrap());

    cache.touch().unwrap();

    assert_eq!(cache.get_value().unwrap(), "kept");
}

#[test]
fn test_touch_on_absent_cache_does_not_make_it_present() {
    let dir = TempDir::new().unwrap();
    let cache = aged_cache(&dir, Duration::ZERO);

    cache.touch().unwrap();

    assert!(cache.path().exists());
    assert!(!cache.is_present().unwrap());
    assert_eq!(cache.get_modification_time_or_absent().unwrap(), None);
}

#[test]
fn test_empty_file_is_absent() {
    let dir = TempDir::new().unwrap();
    let cache = aged_cache(&dir, Duration::ZERO);
    File::create(cache.path()).unwrap();

    assert!(cache.is_not_present().unwrap());
}

#[test]
fn test_modification_time_has_whole_seconds() {
    let dir = TempDir::new().unwrap();
    let cache = aged_cache(&dir, Duration::ZERO);
    let before = Utc::now().trunc_subsecs(0);

    cache.set_value(&"v".to_string()).unwrap();

    let modified = cache.get_modification_time().unwrap();
    assert_eq!(modified.timestamp_subsec_nanos(), 0);
    assert!(modified >= before);
    assert!(modified <= Utc::now());
}
