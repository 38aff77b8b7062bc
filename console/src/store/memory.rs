use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use super::{Record, Repository, StoreError, StoreResult, deep_merge, sanitize_patch};

/// Process-local [`Repository`] backed by a concurrent map
pub struct MemoryStore<T: Record> {
    records: DashMap<String, T>,
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Build the merged record without storing it
    fn merged(current: &T, patch: &Value) -> StoreResult<T> {
        let patch = Value::Object(sanitize_patch(patch)?);

        let mut value = serde_json::to_value(current)?;
        deep_merge(&mut value, &patch);

        let mut updated: T = serde_json::from_value(value).map_err(|e| {
            StoreError::InvalidRecord(format!("Invalid {}: {e}", T::KIND.to_lowercase()))
        })?;
        updated.validate().map_err(StoreError::InvalidRecord)?;
        updated.touch(Utc::now());
        Ok(updated)
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Repository<T> for MemoryStore<T> {
    fn list(&self) -> Vec<T> {
        self.records
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn get(&self, id: &str) -> Option<T> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    fn insert(&self, record: T) -> Option<T> {
        debug!(kind = T::KIND, id = %record.id(), "Storing record");
        self.records.insert(record.id().to_string(), record)
    }

    fn update(&self, id: &str, patch: &Value) -> StoreResult<Option<T>> {
        // Hold the shard lock across merge and write so the update is atomic
        let Some(mut entry) = self.records.get_mut(id) else {
            return Ok(None);
        };
        let updated = Self::merged(entry.value(), patch)?;
        *entry.value_mut() = updated.clone();
        debug!(kind = T::KIND, id = %id, "Updated record");
        Ok(Some(updated))
    }

    fn modify(&self, id: &str, change: &mut dyn FnMut(&mut T)) -> Option<T> {
        let mut entry = self.records.get_mut(id)?;
        let record = entry.value_mut();
        change(record);
        record.touch(Utc::now());
        Some(record.clone())
    }

    fn remove(&self, id: &str) -> bool {
        let removed = self.records.remove(id).is_some();
        if removed {
            debug!(kind = T::KIND, id = %id, "Removed record");
        }
        removed
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Widget {
        id: String,
        name: String,
        size: u32,
        settings: WidgetSettings,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct WidgetSettings {
        color: String,
        shiny: bool,
    }

    impl Record for Widget {
        const KIND: &'static str = "Widget";

        fn id(&self) -> &str {
            &self.id
        }

        fn touch(&mut self, now: DateTime<Utc>) {
            self.updated_at = now;
        }

        fn validate(&self) -> Result<(), String> {
            if self.size > 100 {
                return Err("size must be at most 100".to_string());
            }
            Ok(())
        }
    }

    fn widget() -> Widget {
        let created = "2024-01-01T00:00:00Z".parse().unwrap();
        Widget {
            id: "w-1".into(),
            name: "gizmo".into(),
            size: 3,
            settings: WidgetSettings {
                color: "red".into(),
                shiny: true,
            },
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_insert_get_remove() {
        let store = MemoryStore::new();
        assert!(store.insert(widget()).is_none());
        assert_eq!(store.get("w-1"), Some(widget()));
        assert_eq!(store.len(), 1);
        assert!(store.remove("w-1"));
        assert!(!store.remove("w-1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let store = MemoryStore::new();
        store.insert(widget());

        let updated = store
            .update("w-1", &json!({"settings": {"color": "blue"}}))
            .unwrap()
            .unwrap();

        assert_eq!(updated.settings.color, "blue");
        assert!(updated.settings.shiny);
        assert_eq!(updated.name, "gizmo");
        assert!(updated.updated_at > widget().updated_at);
        assert_eq!(store.get("w-1").unwrap(), updated);
    }

    #[test]
    fn test_protected_fields_ignored() {
        let store = MemoryStore::new();
        store.insert(widget());

        let updated = store
            .update(
                "w-1",
                &json!({"id": "other", "createdAt": "1999-01-01T00:00:00Z"}),
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, "w-1");
        assert_eq!(updated.created_at, widget().created_at);
        assert!(store.get("other").is_none());
    }

    #[test]
    fn test_invalid_update_leaves_record_unchanged() {
        let store = MemoryStore::new();
        store.insert(widget());

        let err = store.update("w-1", &json!({"size": "huge"})).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));

        let err = store.update("w-1", &json!({"size": 1000})).unwrap_err();
        assert_eq!(err.to_string(), "size must be at most 100");

        assert_eq!(store.get("w-1").unwrap(), widget());
    }

    #[test]
    fn test_update_unknown_id() {
        let store: MemoryStore<Widget> = MemoryStore::new();
        assert!(store.update("nope", &json!({"name": "x"})).unwrap().is_none());
        assert!(store.modify("nope", &mut |w| w.size = 1).is_none());
    }

    #[test]
    fn test_modify_in_place() {
        let store = MemoryStore::new();
        store.insert(widget());
        let updated = store.modify("w-1", &mut |w| w.size += 1).unwrap();
        assert_eq!(updated.size, 4);
        assert_eq!(store.get("w-1").unwrap().size, 4);
    }
}
