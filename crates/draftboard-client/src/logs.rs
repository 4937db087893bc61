//! The authoritative in-memory log collection.
//!
//! One [`LogManager`] owns every log the current identity is entitled to
//! see.  The presentation layer reads snapshots and calls the operations
//! here; it never mutates records directly.
//!
//! Synchronization policy: loads are fetch-then-replace; soft-delete is
//! optimistic (local removal first, reconciling reload on failure); every
//! other mutation commits to the store first and patches local state only
//! after the store confirms.  Mutations on one record are serialized in
//! issue order through [`RecordLocks`].

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{info, warn};

use draftboard_api::logs::{LogPayload, NewComment};
use draftboard_api::ApiClient;
use draftboard_shared::{DesignLog, User};

use crate::error::{ClientError, Result};
use crate::locks::RecordLocks;

/// Editable fields of a log, as they come from the editor.
#[derive(Debug, Clone)]
pub struct LogDraft {
    /// `Some` updates the existing record; `None` creates a new one.
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub category: Option<String>,
    pub linked_log_ids: Vec<String>,
    pub image_url: Option<String>,
}

/// An image picked in the editor, uploaded before the log is persisted.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Owner of the session's log collection.
pub struct LogManager {
    api: Arc<ApiClient>,
    logs: Mutex<Vec<DesignLog>>,
    locks: RecordLocks,
}

impl LogManager {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            logs: Mutex::new(Vec::new()),
            locks: RecordLocks::new(),
        }
    }

    /// Fetch the full remote set, keep what `identity` may see, sort by
    /// date descending and replace the local collection.
    ///
    /// Fetch-then-replace, never merge: re-running for a new identity
    /// must not leak the previous user's logs, not even momentarily.
    pub async fn load(&self, identity: &User) -> Result<Vec<DesignLog>> {
        let fetched = self.api.logs().get_all().await?;

        let mut visible: Vec<DesignLog> = if identity.is_admin() {
            fetched
        } else {
            fetched
                .into_iter()
                .filter(|log| log.user_id == identity.id)
                .collect()
        };
        // Stable sort: same-date records keep their fetched order.
        visible.sort_by(|a, b| b.date.cmp(&a.date));

        info!(count = visible.len(), user = %identity.id, "logs loaded");
        *self.logs.lock().await = visible.clone();
        Ok(visible)
    }

    /// Snapshot of the collection.  Soft-deleted records are included;
    /// the projections decide what each view shows.
    pub async fn snapshot(&self) -> Vec<DesignLog> {
        self.logs.lock().await.clone()
    }

    /// Create or update a log, uploading `image` first when one is given.
    ///
    /// The upload strictly precedes persistence, so a stored log never
    /// references an image the store does not have.  Create prepends the
    /// store's record; update replaces in place by id.  Ownership is
    /// stamped from `identity`, never taken from the draft.
    pub async fn save(
        &self,
        identity: &User,
        mut draft: LogDraft,
        image: Option<ImageUpload>,
    ) -> Result<DesignLog> {
        if let Some(image) = image {
            let url = self
                .api
                .logs()
                .upload_image(&image.file_name, image.bytes)
                .await?;
            draft.image_url = Some(url);
        }

        match draft.id.take() {
            None => self.create(identity, draft).await,
            Some(id) => self.update(identity, id, draft).await,
        }
    }

    async fn create(&self, identity: &User, draft: LogDraft) -> Result<DesignLog> {
        let payload = LogPayload {
            title: draft.title,
            description: draft.description,
            date: draft.date,
            category: draft.category,
            linked_log_ids: draft.linked_log_ids,
            image_url: draft.image_url,
            user_id: identity.id.clone(),
        };

        let created = self.api.logs().create(&payload).await?;
        info!(id = %created.id, "log created");

        let mut logs = self.logs.lock().await;
        logs.insert(0, created.clone());
        Ok(created)
    }

    async fn update(&self, identity: &User, id: String, draft: LogDraft) -> Result<DesignLog> {
        let lock = self.locks.for_record(&id).await;
        let _guard = lock.lock().await;

        let mut record = {
            let logs = self.logs.lock().await;
            logs.iter().find(|log| log.id == id).cloned()
        }
        .ok_or_else(|| ClientError::UnknownLog(id.clone()))?;

        record.title = draft.title;
        record.description = draft.description;
        record.date = draft.date;
        record.category = draft.category;
        record.linked_log_ids = draft.linked_log_ids;
        record.image_url = draft.image_url;
        record.user_id = identity.id.clone();

        let updated = self.api.logs().update(&record).await?;
        info!(id = %updated.id, "log updated");

        let mut logs = self.logs.lock().await;
        replace_log(&mut logs, &updated);
        Ok(updated)
    }

    /// Soft-delete a log, optimistically.
    ///
    /// The record leaves the local collection before the remote call is
    /// issued, so the UI reflects the deletion immediately.  If the store
    /// rejects it, the collection is reconciled by reloading the remote
    /// state — never by re-inserting the stale local copy — and the error
    /// is returned.
    pub async fn delete(&self, identity: &User, id: &str) -> Result<()> {
        {
            let mut logs = self.logs.lock().await;
            logs.retain(|log| log.id != id);
        }

        let lock = self.locks.for_record(id).await;
        let _guard = lock.lock().await;

        if let Err(err) = self.api.logs().delete(id).await {
            warn!(id = %id, error = %err, "soft-delete failed, reloading collection");
            self.load(identity).await?;
            return Err(err.into());
        }
        info!(id = %id, "log moved to trash");
        Ok(())
    }

    /// Restore a soft-deleted log.  Not optimistic: restore is a
    /// deliberate recovery action, so the UI waits for the store's
    /// confirmed record before showing it.
    pub async fn restore(&self, id: &str) -> Result<DesignLog> {
        let lock = self.locks.for_record(id).await;
        let _guard = lock.lock().await;

        let restored = self.api.logs().restore(id).await?;
        info!(id = %id, "log restored");

        let mut logs = self.logs.lock().await;
        replace_log(&mut logs, &restored);
        Ok(restored)
    }

    /// Remove a log from the store for good.  Remote first: there is no
    /// local compensation possible if this fails, so failure is surfaced
    /// as-is and local state stays untouched.
    pub async fn permanently_delete(&self, id: &str) -> Result<()> {
        let lock = self.locks.for_record(id).await;
        {
            let _guard = lock.lock().await;
            self.api.logs().permanently_delete(id).await?;

            let mut logs = self.logs.lock().await;
            logs.retain(|log| log.id != id);
        }
        self.locks.forget(id).await;
        info!(id = %id, "log permanently deleted");
        Ok(())
    }

    /// Append a comment.  The store stamps id and date and returns the
    /// full record, which replaces the local one — comment ordering and
    /// timestamps are authoritative from the store, never computed here.
    pub async fn add_comment(&self, identity: &User, log_id: &str, text: &str) -> Result<DesignLog> {
        let lock = self.locks.for_record(log_id).await;
        let _guard = lock.lock().await;

        let comment = NewComment {
            text: text.to_string(),
            author: identity.name.clone(),
            author_id: identity.id.clone(),
        };
        let updated = self.api.logs().add_comment(log_id, &comment).await?;
        info!(id = %log_id, "comment added");

        let mut logs = self.logs.lock().await;
        replace_log(&mut logs, &updated);
        Ok(updated)
    }
}

fn replace_log(logs: &mut [DesignLog], updated: &DesignLog) {
    if let Some(slot) = logs.iter_mut().find(|log| log.id == updated.id) {
        *slot = updated.clone();
    }
}
