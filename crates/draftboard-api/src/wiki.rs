//! Requests for the `/wiki` endpoints.

use chrono::{DateTime, Utc};
use draftboard_shared::{WikiComment, WikiPage};
use serde::Serialize;

use crate::{take_array, take_record, ApiClient, Result};

/// Payload for creating a page.  The store assigns the id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWikiPage {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub images: Vec<String>,
    pub comments: Vec<WikiComment>,
    pub created_by: String,
    pub created_by_name: String,
    pub last_modified: DateTime<Utc>,
}

/// Partial page update.  Only the populated fields are sent; the store
/// merges them onto the record, so an edit and a comment append can share
/// this one path.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiPageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<WikiComment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

pub struct WikiApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl WikiApi<'_> {
    pub async fn get_all(&self) -> Result<Vec<WikiPage>> {
        let body = self.client.get_json("/wiki").await?;
        take_array(body, "pages")?
            .into_iter()
            .map(|raw| serde_json::from_value(raw).map_err(Into::into))
            .collect()
    }

    pub async fn create(&self, page: &NewWikiPage) -> Result<WikiPage> {
        let body = self.client.post_json("/wiki", page).await?;
        Ok(serde_json::from_value(take_record(body, "page")?)?)
    }

    pub async fn update(&self, page_id: &str, update: &WikiPageUpdate) -> Result<WikiPage> {
        let body = self
            .client
            .put_json(&format!("/wiki/{page_id}"), update)
            .await?;
        Ok(serde_json::from_value(take_record(body, "page")?)?)
    }

    pub async fn delete(&self, page_id: &str) -> Result<()> {
        self.client.delete(&format!("/wiki/{page_id}")).await?;
        Ok(())
    }
}
