//! Structured records stored as JSON text.
//!
//! Records go through whichever [`TextChannel`] the caller supplies, so the
//! same code serves plain and encrypted entries.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::name::EntryPath;
use crate::text::TextChannel;
use crate::{CacheError, Result};

/// Serialize `record` and write it through `sink`.
///
/// A value serde cannot represent as JSON (for example a map with non-string
/// keys) is a [`CacheError::WriteFailed`].
pub fn write_record<S, T>(sink: S, entry: &EntryPath, record: &T) -> Result<()>
where
    S: TextChannel,
    T: Serialize + ?Sized,
{
    let text = serde_json::to_string(record).map_err(|e| CacheError::write_failed(entry, e))?;
    sink.write_text(entry, &text)
}

/// Read text through `source` and parse it as `T`.
///
/// Read and decrypt errors are returned as-is. Text that was read fine but
/// does not parse into `T` is a [`CacheError::ParseFailed`].
pub fn read_record<S, T>(source: S, entry: &EntryPath) -> Result<T>
where
    S: TextChannel,
    T: DeserializeOwned,
{
    let text = source.read_text(entry)?;
    serde_json::from_str(&text).map_err(|source| CacheError::ParseFailed {
        name: entry.name().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::resolve;
    use crate::raw::RawStore;
    use crate::text::PlainText;
    use serde::Deserialize;
    use std::collections::{BTreeMap, HashMap};
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        id: u64,
        display_name: String,
        tags: Vec<String>,
        bio: Option<String>,
    }

    #[test]
    fn test_struct_roundtrip() {
        let dir = tempdir().unwrap();
        let raw = RawStore::default();
        let entry = resolve(dir.path(), "profile").unwrap();
        let profile = Profile {
            id: 7,
            display_name: "Ada\nLovelace".into(),
            tags: vec!["math".into(), "engines".into()],
            bio: None,
        };

        write_record(PlainText::new(&raw), &entry, &profile).unwrap();
        let back: Profile = read_record(PlainText::new(&raw), &entry).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_dynamic_value_roundtrip() {
        let dir = tempdir().unwrap();
        let raw = RawStore::default();
        let entry = resolve(dir.path(), "settings").unwrap();
        let value = serde_json::json!({
            "theme": "dark",
            "volume": 0.75,
            "recent": [1, 2, 3],
            "nested": { "enabled": true, "missing": null }
        });

        write_record(PlainText::new(&raw), &entry, &value).unwrap();
        let back: serde_json::Value = read_record(PlainText::new(&raw), &entry).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_malformed_content_is_parse_failure() {
        let dir = tempdir().unwrap();
        let raw = RawStore::default();
        let entry = resolve(dir.path(), "broken").unwrap();
        PlainText::new(&raw).write_text(&entry, "{\"id\": 7,").unwrap();

        let err = read_record::<_, Profile>(PlainText::new(&raw), &entry).unwrap_err();
        assert!(matches!(err, CacheError::ParseFailed { .. }), "got {err:?}");
    }

    #[test]
    fn test_wrong_shape_is_parse_failure() {
        let dir = tempdir().unwrap();
        let raw = RawStore::default();
        let entry = resolve(dir.path(), "list").unwrap();
        write_record(PlainText::new(&raw), &entry, &vec![1, 2, 3]).unwrap();

        let err = read_record::<_, Profile>(PlainText::new(&raw), &entry).unwrap_err();
        assert!(matches!(err, CacheError::ParseFailed { .. }));
    }

    #[test]
    fn test_missing_entry_is_not_parse_failure() {
        let dir = tempdir().unwrap();
        let raw = RawStore::default();
        let entry = resolve(dir.path(), "absent").unwrap();

        let err = read_record::<_, Profile>(PlainText::new(&raw), &entry).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unrepresentable_record_is_write_failure() {
        let dir = tempdir().unwrap();
        let raw = RawStore::default();
        let entry = resolve(dir.path(), "map").unwrap();
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple keys are not JSON");

        let err = write_record(PlainText::new(&raw), &entry, &map).unwrap_err();
        assert!(matches!(err, CacheError::WriteFailed { .. }));
        assert!(!entry.path().exists());
    }

    #[test]
    fn test_ordered_map_roundtrip() {
        let dir = tempdir().unwrap();
        let raw = RawStore::default();
        let entry = resolve(dir.path(), "counts").unwrap();
        let counts: BTreeMap<String, i64> =
            [("a".to_string(), 1), ("b".to_string(), -2)].into_iter().collect();

        write_record(PlainText::new(&raw), &entry, &counts).unwrap();
        let back: BTreeMap<String, i64> = read_record(PlainText::new(&raw), &entry).unwrap();
        assert_eq!(back, counts);
    }
}
