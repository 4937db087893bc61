//! Team wiki pages.
//!
//! Pages are shared: everyone sees and may edit every page.  Unlike log
//! comments, wiki comments are stamped on the client and pushed through
//! the ordinary page-update path, because a comment is just one more
//! edit of the page record.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use draftboard_api::wiki::{NewWikiPage, WikiPageUpdate};
use draftboard_api::ApiClient;
use draftboard_shared::{User, WikiComment, WikiPage};

use crate::error::{ClientError, Result};

pub struct WikiManager {
    api: Arc<ApiClient>,
    pages: Mutex<Vec<WikiPage>>,
}

impl WikiManager {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            pages: Mutex::new(Vec::new()),
        }
    }

    /// Fetch every page and replace the local collection.
    pub async fn load(&self) -> Result<Vec<WikiPage>> {
        let fetched = self.api.wiki().get_all().await?;
        info!(count = fetched.len(), "wiki pages loaded");
        *self.pages.lock().await = fetched.clone();
        Ok(fetched)
    }

    pub async fn snapshot(&self) -> Vec<WikiPage> {
        self.pages.lock().await.clone()
    }

    /// Create a fresh page with placeholder content, attributed to
    /// `identity`, and prepend it so the editor can open it immediately.
    pub async fn create(&self, identity: &User) -> Result<WikiPage> {
        let payload = NewWikiPage {
            title: "New Page".to_string(),
            content: "Start writing your wiki content here...".to_string(),
            category: None,
            images: Vec::new(),
            comments: Vec::new(),
            created_by: identity.id.clone(),
            created_by_name: identity.name.clone(),
            last_modified: Utc::now(),
        };

        let created = self.api.wiki().create(&payload).await?;
        info!(id = %created.id, "wiki page created");

        let mut pages = self.pages.lock().await;
        pages.insert(0, created.clone());
        Ok(created)
    }

    /// Apply an edit to a page.  `last_modified` is always refreshed,
    /// whatever the caller put in the update.
    pub async fn update_page(&self, id: &str, mut update: WikiPageUpdate) -> Result<WikiPage> {
        update.last_modified = Some(Utc::now());

        let updated = self.api.wiki().update(id, &update).await?;
        info!(id = %id, "wiki page updated");

        let mut pages = self.pages.lock().await;
        if let Some(slot) = pages.iter_mut().find(|p| p.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Append a comment to a page.  The comment is stamped here and the
    /// full comment list travels through the page-update path.
    pub async fn add_comment(&self, identity: &User, page_id: &str, text: &str) -> Result<WikiPage> {
        let mut comments = {
            let pages = self.pages.lock().await;
            pages
                .iter()
                .find(|p| p.id == page_id)
                .map(|p| p.comments.clone())
        }
        .ok_or_else(|| ClientError::UnknownPage(page_id.to_string()))?;

        comments.push(WikiComment {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            author: identity.name.clone(),
            author_id: identity.id.clone(),
            date: Utc::now(),
        });

        self.update_page(
            page_id,
            WikiPageUpdate {
                comments: Some(comments),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete a page.  Remote first; wiki pages have no trash.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.api.wiki().delete(id).await?;
        info!(id = %id, "wiki page deleted");

        let mut pages = self.pages.lock().await;
        pages.retain(|p| p.id != id);
        Ok(())
    }
}
