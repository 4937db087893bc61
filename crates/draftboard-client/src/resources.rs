//! Shared resource links.
//!
//! Resources are visible to everyone regardless of who added them, so
//! loading never filters.  Attribution and the team/personal split are
//! decided here from the current identity at the moment a link is added.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;

use draftboard_api::resources::{NewResource, ResourceUpdate};
use draftboard_api::ApiClient;
use draftboard_shared::{Resource, User};

use crate::error::Result;

/// Editable fields of a resource link.
#[derive(Debug, Clone)]
pub struct ResourceDraft {
    pub title: String,
    pub url: String,
    pub description: String,
    pub category: String,
}

pub struct ResourceManager {
    api: Arc<ApiClient>,
    resources: Mutex<Vec<Resource>>,
}

impl ResourceManager {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            resources: Mutex::new(Vec::new()),
        }
    }

    /// Fetch every resource and replace the local collection.
    pub async fn load(&self) -> Result<Vec<Resource>> {
        let fetched = self.api.resources().get_all().await?;
        info!(count = fetched.len(), "resources loaded");
        *self.resources.lock().await = fetched.clone();
        Ok(fetched)
    }

    pub async fn snapshot(&self) -> Vec<Resource> {
        self.resources.lock().await.clone()
    }

    /// Add a link on behalf of `identity`.  Admins publish team
    /// resources; everyone else adds personal ones.  The stamp happens
    /// here so a draft can never claim someone else's attribution.
    pub async fn add(&self, identity: &User, draft: ResourceDraft) -> Result<Resource> {
        let payload = NewResource {
            title: draft.title,
            url: draft.url,
            description: draft.description,
            category: draft.category,
            added_by: identity.name.clone(),
            added_by_id: identity.id.clone(),
            added_date: Utc::now(),
            is_admin_resource: identity.is_admin(),
        };

        let created = self.api.resources().create(&payload).await?;
        info!(id = %created.id, team = created.is_admin_resource, "resource added");

        let mut resources = self.resources.lock().await;
        resources.insert(0, created.clone());
        Ok(created)
    }

    /// Edit a link's descriptive fields.  Commits remotely first, then
    /// replaces the local record with the store's version.
    pub async fn update(&self, id: &str, update: &ResourceUpdate) -> Result<Resource> {
        let updated = self.api.resources().update(id, update).await?;
        info!(id = %id, "resource updated");

        let mut resources = self.resources.lock().await;
        if let Some(slot) = resources.iter_mut().find(|r| r.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Remove a link.  Remote first; the local copy only goes once the
    /// store has confirmed.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.api.resources().delete(id).await?;
        info!(id = %id, "resource deleted");

        let mut resources = self.resources.lock().await;
        resources.retain(|r| r.id != id);
        Ok(())
    }
}
