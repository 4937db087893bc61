//! Requests for the `/logs` endpoints, including image upload.

use chrono::NaiveDate;
use draftboard_shared::{normalize, DesignLog};
use serde::Serialize;
use serde_json::Value;

use crate::{take_array, take_record, ApiClient, ApiError, Result};

/// Fields of a log the caller controls.  The store assigns `id` on create;
/// ownership (`user_id`) is stamped by the log manager, never taken from a
/// form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPayload {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub category: Option<String>,
    pub linked_log_ids: Vec<String>,
    pub image_url: Option<String>,
    pub user_id: String,
}

/// A comment body to append.  The store stamps id and date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub text: String,
    pub author: String,
    pub author_id: String,
}

pub struct LogsApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl LogsApi<'_> {
    /// List every log in the store, normalized.
    pub async fn get_all(&self) -> Result<Vec<DesignLog>> {
        let body = self.client.get_json("/logs").await?;
        take_array(body, "logs")?
            .into_iter()
            .map(|raw| normalize::normalize_log(raw).map_err(Into::into))
            .collect()
    }

    pub async fn create(&self, payload: &LogPayload) -> Result<DesignLog> {
        let body = self.client.post_json("/logs", payload).await?;
        Ok(normalize::normalize_log(take_record(body, "log")?)?)
    }

    /// Replace a log with the given record.  The full record is sent, so
    /// cleared optionals reach the store as explicit nulls.
    pub async fn update(&self, log: &DesignLog) -> Result<DesignLog> {
        let body = self
            .client
            .put_json(&format!("/logs/{}", log.id), log)
            .await?;
        Ok(normalize::normalize_log(take_record(body, "log")?)?)
    }

    /// Soft-delete: the record stays in the store, flagged as deleted.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("/logs/{id}")).await?;
        Ok(())
    }

    /// Clear the deleted flag and return the store's version of the record.
    pub async fn restore(&self, id: &str) -> Result<DesignLog> {
        let body = self
            .client
            .post_empty(&format!("/logs/{id}/restore"))
            .await?;
        Ok(normalize::normalize_log(take_record(body, "log")?)?)
    }

    /// Remove the record from the store entirely.  Irreversible.
    pub async fn permanently_delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("/logs/{id}/permanent")).await?;
        Ok(())
    }

    /// Append a comment and return the store's full updated record.
    pub async fn add_comment(&self, log_id: &str, comment: &NewComment) -> Result<DesignLog> {
        let body = self
            .client
            .post_json(&format!("/logs/{log_id}/comments"), comment)
            .await?;
        Ok(normalize::normalize_log(take_record(body, "log")?)?)
    }

    /// Upload an image and return the opaque URL to reference it by.
    pub async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let body = self.client.post_multipart("/upload-image", form).await?;
        match body.get("imageUrl").and_then(Value::as_str) {
            Some(url) => Ok(url.to_string()),
            None => {
                use serde::de::Error as _;
                Err(ApiError::Decode(serde_json::Error::custom(
                    "upload response is missing `imageUrl`",
                )))
            }
        }
    }
}
