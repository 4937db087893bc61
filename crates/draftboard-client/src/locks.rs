//! Per-record mutation serialization.
//!
//! Two rapid edits to the same log must take effect in the order they were
//! issued, not the order their responses arrive.  Each record id gets one
//! FIFO async mutex; a mutating operation holds it for its whole remote
//! round trip, so an older request can never land after (and overwrite) a
//! newer one.  Operations on different records stay independent.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Registry of one async mutex per record id.
#[derive(Default)]
pub struct RecordLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock handle for the given record, created on first use.
    pub async fn for_record(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(id.to_string()).or_default().clone()
    }

    /// Drop a record's entry once it is gone for good.
    pub async fn forget(&self, id: &str) {
        let mut locks = self.locks.lock().await;
        locks.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_record_serializes_in_issue_order() {
        let locks = Arc::new(RecordLocks::new());
        let finished = Arc::new(Mutex::new(Vec::new()));

        // First holder sleeps while holding the lock; the second must wait
        // even though it would finish instantly on its own.
        let first = {
            let locks = locks.clone();
            let finished = finished.clone();
            tokio::spawn(async move {
                let lock = locks.for_record("l1").await;
                let _guard = lock.lock().await;
                tokio::time::sleep(Duration::from_millis(50)).await;
                finished.lock().await.push("first");
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = {
            let locks = locks.clone();
            let finished = finished.clone();
            tokio::spawn(async move {
                let lock = locks.for_record("l1").await;
                let _guard = lock.lock().await;
                finished.lock().await.push("second");
            })
        };

        first.await.unwrap();
        second.await.unwrap();
        assert_eq!(*finished.lock().await, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_different_records_do_not_block_each_other() {
        let locks = RecordLocks::new();
        let counter = AtomicUsize::new(0);

        let a = locks.for_record("a").await;
        let _guard_a = a.lock().await;

        // "b" is free while "a" is held.
        let b = locks.for_record("b").await;
        let _guard_b = b.lock().await;
        counter.fetch_add(1, Ordering::SeqCst);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_forget_clears_the_entry() {
        let locks = RecordLocks::new();
        let _ = locks.for_record("gone").await;
        locks.forget("gone").await;
        assert!(locks.locks.lock().await.is_empty());
    }
}
