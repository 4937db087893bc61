//! Requests for the `/resources` endpoints.

use chrono::{DateTime, Utc};
use draftboard_shared::Resource;
use serde::Serialize;

use crate::{take_array, take_record, ApiClient, Result};

/// Payload for adding a resource.  Attribution fields are stamped by the
/// resource manager from the current identity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResource {
    pub title: String,
    pub url: String,
    pub description: String,
    pub category: String,
    pub added_by: String,
    pub added_by_id: String,
    pub added_date: DateTime<Utc>,
    pub is_admin_resource: bool,
}

/// Partial resource update; only the populated fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

pub struct ResourcesApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl ResourcesApi<'_> {
    pub async fn get_all(&self) -> Result<Vec<Resource>> {
        let body = self.client.get_json("/resources").await?;
        take_array(body, "resources")?
            .into_iter()
            .map(|raw| serde_json::from_value(raw).map_err(Into::into))
            .collect()
    }

    pub async fn create(&self, resource: &NewResource) -> Result<Resource> {
        let body = self.client.post_json("/resources", resource).await?;
        Ok(serde_json::from_value(take_record(body, "resource")?)?)
    }

    pub async fn update(&self, resource_id: &str, update: &ResourceUpdate) -> Result<Resource> {
        let body = self
            .client
            .put_json(&format!("/resources/{resource_id}"), update)
            .await?;
        Ok(serde_json::from_value(take_record(body, "resource")?)?)
    }

    pub async fn delete(&self, resource_id: &str) -> Result<()> {
        self.client.delete(&format!("/resources/{resource_id}")).await?;
        Ok(())
    }
}
