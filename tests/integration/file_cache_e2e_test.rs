// End-to-end cache scenarios
//
// - value round trips through custom, serde and JSON codecs
// - delete / get-and-set / get-and-delete sequencing
// - shred leaves nothing behind

use std::fs;

use filecache::codec::{JsonCodec, ListCodec, SerializedCodec, StringCodec};
use filecache::{CacheError, CacheUpdate, FileCache};
use tempfile::TempDir;

use super::test_support::{User, UserCodec};

#[test]
fn test_user_lifecycle() {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(dir.path().join("user"), UserCodec);

    cache.set_value(&User::new(1, "A")).unwrap();
    assert_eq!(cache.get_value().unwrap(), User::new(1, "A"));

    cache.delete().unwrap();
    assert_eq!(cache.get_value_or_absent().unwrap(), None);

    let previous = cache.get_and_set_value(&User::anonymous(2)).unwrap();
    assert_eq!(previous, None);
    assert!(cache.is_present().unwrap());
    assert_eq!(cache.get_value().unwrap(), User::anonymous(2));

    assert_eq!(cache.get_and_delete().unwrap(), Some(User::anonymous(2)));
    assert!(matches!(cache.get_value(), Err(CacheError::NotPresent)));
}

#[test]
fn test_serde_codecs_round_trip_users() {
    let dir = TempDir::new().unwrap();

    let packed = FileCache::new(dir.path().join("packed"), SerializedCodec::<User>::new());
    packed.set_value(&User::new(7, "msgpack")).unwrap();
    assert_eq!(packed.get_value().unwrap(), User::new(7, "msgpack"));

    let json = FileCache::new(dir.path().join("json"), JsonCodec::<User>::new());
    json.set_value(&User::anonymous(8)).unwrap();
    assert_eq!(json.get_value().unwrap(), User::anonymous(8));

    let raw = fs::read(json.path()).unwrap();
    let text = String::from_utf8_lossy(&raw[4..]);
    assert!(text.contains("\"uid\":8"));
}

#[test]
fn test_list_of_users() {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(dir.path().join("users"), ListCodec::new(UserCodec));

    let users = vec![User::new(1, "a"), User::anonymous(2), User::new(3, "")];
    cache.set_value(&users).unwrap();
    assert_eq!(cache.get_value().unwrap(), users);

    cache
        .update_existing_value(|mut users| {
            users.retain(|u| u.name.is_some());
            Some(users)
        })
        .unwrap();
    assert_eq!(cache.get_value().unwrap().len(), 2);
}

#[test]
fn test_shred_destroys_entry() {
    let dir = TempDir::new().unwrap();
    let cache: FileCache<String> = FileCache::new(dir.path().join("secret"), StringCodec);
    cache.set_value(&"p@ssw0rd".repeat(2048)).unwrap();
    assert!(cache.is_present().unwrap());

    cache.shred().unwrap();

    assert!(!cache.path().exists());
    assert!(!cache.is_present().unwrap());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_snapshot_age_follows_written_time() {
    let dir = TempDir::new().unwrap();
    let cache: FileCache<String> = FileCache::new(dir.path().join("aged"), StringCodec);
    let now = chrono::Utc::now();

    cache
        .update(|_| {
            Some(CacheUpdate::from_age(
                "old".to_string(),
                chrono::Duration::hours(2),
                now,
            ))
        })
        .unwrap();

    let age = cache.get_snapshot().unwrap().age();
    assert!(age >= chrono::Duration::hours(2));
    assert!(age < chrono::Duration::hours(2) + chrono::Duration::minutes(1));
}

#[test]
fn test_corrupt_entry_surfaces_codec_error() {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(dir.path().join("user"), UserCodec);
    fs::write(cache.path(), [0u8; 5]).unwrap();

    let err = cache.get_value_or_absent().unwrap_err();
    assert!(err.is_io());

    // The broken entry can still be replaced
    cache.set_value(&User::new(1, "fixed")).unwrap();
    assert_eq!(cache.get_value().unwrap(), User::new(1, "fixed"));
}
