//! Requests for the `/users` endpoints.

use draftboard_shared::{normalize, Tab, User};
use serde::Serialize;

use crate::{take_array, take_record, ApiClient, Result};

/// Payload for creating an account.  The store derives the id from the
/// name and assigns the schema defaults.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub role: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PinUpdate<'a> {
    pin: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccessUpdate<'a> {
    accessible_tabs: &'a [Tab],
}

pub struct UsersApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl UsersApi<'_> {
    /// List every known account, normalized.
    pub async fn get_all(&self) -> Result<Vec<User>> {
        let body = self.client.get_json("/users").await?;
        take_array(body, "users")?
            .into_iter()
            .map(|raw| normalize::normalize_user(raw).map_err(Into::into))
            .collect()
    }

    pub async fn create(&self, user: &NewUser) -> Result<User> {
        let body = self.client.post_json("/users", user).await?;
        Ok(normalize::normalize_user(take_record(body, "user")?)?)
    }

    pub async fn update_pin(&self, user_id: &str, pin: &str) -> Result<User> {
        let body = self
            .client
            .put_json(&format!("/users/{user_id}/pin"), &PinUpdate { pin })
            .await?;
        Ok(normalize::normalize_user(take_record(body, "user")?)?)
    }

    /// Replace the user's accessible-tab set.  Always the full set, never a
    /// diff.
    pub async fn update_access(&self, user_id: &str, tabs: &[Tab]) -> Result<User> {
        let body = self
            .client
            .put_json(
                &format!("/users/{user_id}/access"),
                &AccessUpdate { accessible_tabs: tabs },
            )
            .await?;
        Ok(normalize::normalize_user(take_record(body, "user")?)?)
    }

    pub async fn delete(&self, user_id: &str) -> Result<()> {
        self.client.delete(&format!("/users/{user_id}")).await?;
        Ok(())
    }
}
