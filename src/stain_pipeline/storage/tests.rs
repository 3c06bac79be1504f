#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::stain_pipeline::common::error::{Result, StainError};
    use crate::stain_pipeline::estimation::CalculationRecord;
    use crate::stain_pipeline::storage::{
        FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, ResultStore, STORAGE_KEY,
    };

    fn record(points_in_stain: usize) -> CalculationRecord {
        CalculationRecord::new(100, points_in_stain, 400, String::new(), 0.25)
    }

    /// Backend whose writes can be switched to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryKeyValueStore,
        fail_writes: AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StainError::Persistence("disk full".to_string()));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key).await
        }
    }

    async fn stored_json(backend: &MemoryKeyValueStore) -> serde_json::Value {
        let raw = backend.get(STORAGE_KEY).await.unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_append_puts_newest_first() {
        let store = ResultStore::in_memory();
        let first = record(10);
        let second = record(20);

        store.append(first.clone()).await.unwrap();
        store.append(second.clone()).await.unwrap();

        let listed = store.list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_append_rejects_duplicate_id() {
        let store = ResultStore::in_memory();
        let rec = record(1);
        store.append(rec.clone()).await.unwrap();

        let result = store.append(rec).await;
        assert!(matches!(result, Err(StainError::InvalidInput(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_append_writes_through() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = ResultStore::open(Some(backend.clone())).await.unwrap();
        assert!(store.is_persistent());

        let rec = record(30);
        store.append(rec.clone()).await.unwrap();

        let json = stored_json(&backend).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["id"], rec.id.as_str());
        assert_eq!(json[0]["pointsInStain"], 30);
    }

    #[tokio::test]
    async fn test_delete_existing_record() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = ResultStore::open(Some(backend.clone())).await.unwrap();
        let keep = record(1);
        let drop = record(2);
        store.append(keep.clone()).await.unwrap();
        store.append(drop.clone()).await.unwrap();

        let removed = store.delete_by_id(&drop.id).await.unwrap();
        assert_eq!(removed.id, drop.id);
        assert_eq!(store.len().await, 1);
        assert!(store.get(&drop.id).await.is_none());
        assert!(store.get(&keep.id).await.is_some());
        assert_eq!(stored_json(&backend).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_leaves_collection() {
        let store = ResultStore::in_memory();
        store.append(record(1)).await.unwrap();
        let before = store.list().await;

        let result = store.delete_by_id("missing").await;
        assert!(matches!(result, Err(StainError::NotFound(ref id)) if id == "missing"));
        assert_eq!(store.list().await, before);
    }

    #[tokio::test]
    async fn test_clear_persists_empty_collection() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = ResultStore::open(Some(backend.clone())).await.unwrap();
        store.append(record(1)).await.unwrap();
        store.append(record(2)).await.unwrap();

        store.clear().await.unwrap();
        assert!(store.is_empty().await);
        assert_eq!(stored_json(&backend).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_reload_restores_records_and_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let backend: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(dir.path()));

        let older = record(5);
        let newer = record(6);
        {
            let store = ResultStore::open(Some(backend.clone())).await.unwrap();
            store.append(older.clone()).await.unwrap();
            store.append(newer.clone()).await.unwrap();
        }

        let reopened = ResultStore::open(Some(backend)).await.unwrap();
        let listed = reopened.list().await;
        assert_eq!(listed, vec![newer.clone(), older.clone()]);
        assert_eq!(listed[0].timestamp, newer.timestamp);
        assert_eq!(listed[1].timestamp, older.timestamp);
    }

    #[tokio::test]
    async fn test_load_skips_malformed_entries() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let good = record(3);
        let mut inconsistent = record(4);
        inconsistent.points_in_stain = 500;

        let raw = serde_json::json!([
            serde_json::to_value(&good).unwrap(),
            {"id": "broken", "timestamp": "not a date"},
            serde_json::to_value(&inconsistent).unwrap(),
            serde_json::to_value(&good).unwrap(),
            42,
        ]);
        backend.set(STORAGE_KEY, &raw.to_string()).await.unwrap();

        let store = ResultStore::open(Some(backend)).await.unwrap();
        assert_eq!(store.list().await, vec![good]);
    }

    #[tokio::test]
    async fn test_load_tolerates_corrupt_blob() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        backend.set(STORAGE_KEY, "{ not json").await.unwrap();

        let store = ResultStore::open(Some(backend)).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_no_backend_is_in_memory_only() {
        let store = ResultStore::open(None).await.unwrap();
        assert!(!store.is_persistent());

        let rec = record(9);
        store.append(rec.clone()).await.unwrap();
        store.delete_by_id(&rec.id).await.unwrap();
        store.append(record(8)).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_persistence_failure_still_updates_memory() {
        let backend = Arc::new(FlakyStore::default());
        let store = ResultStore::open(Some(backend.clone())).await.unwrap();
        backend.fail_writes.store(true, Ordering::SeqCst);

        let rec = record(7);
        let result = store.append(rec.clone()).await;
        assert!(matches!(result, Err(StainError::Persistence(_))));
        assert_eq!(store.list().await, vec![rec]);
        assert!(backend.inner.get(STORAGE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_mutations() {
        let store = ResultStore::in_memory();
        let mut rx = store.subscribe();
        assert!(rx.borrow_and_update().is_empty());

        let rec = record(11);
        store.append(rec.clone()).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update()[0].id, rec.id);

        store.clear().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = Arc::new(ResultStore::open(Some(backend.clone())).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.append(record(i)).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.len().await, 16);
        assert_eq!(stored_json(&backend).await.as_array().unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_summary() {
        let store = ResultStore::in_memory();
        assert_eq!(store.summary().await.total_calculations, 0);

        // 100 samples over a 400 px box: 50 -> 200 px, 25 -> 100 px.
        store.append(record(50)).await.unwrap();
        store.append(record(25)).await.unwrap();

        let summary = store.summary().await;
        assert_eq!(summary.total_calculations, 2);
        assert_eq!(summary.total_samples, 200);
        assert_eq!(summary.average_stain_area, 150.0);
        assert_eq!(summary.average_coverage, 0.375);
    }

    #[tokio::test]
    async fn test_file_store_get_set_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("nested"));

        assert_eq!(store.get("history").await.unwrap(), None);
        store.set("history", "[1,2]").await.unwrap();
        assert_eq!(store.get("history").await.unwrap().as_deref(), Some("[1,2]"));
        assert!(dir.path().join("nested").join("history.json").exists());

        store.remove("history").await.unwrap();
        assert_eq!(store.get("history").await.unwrap(), None);
        store.remove("history").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        assert!(matches!(
            store.set("../escape", "x").await,
            Err(StainError::Persistence(_))
        ));
    }
}
