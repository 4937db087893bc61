//! Identity and roster management.
//!
//! Holds the signed-in identity and the roster of known users.  Every
//! remote-affecting operation commits to the store first and touches local
//! state only after the store confirms, so a failure never leaves the
//! roster ahead of the remote state.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use draftboard_api::users::NewUser;
use draftboard_api::ApiClient;
use draftboard_shared::{Tab, User};

use crate::error::{ClientError, Result};

#[derive(Default)]
struct SessionState {
    users: Vec<User>,
    current: Option<User>,
}

/// Session and roster manager.
pub struct SessionManager {
    api: Arc<ApiClient>,
    state: Mutex<SessionState>,
}

impl SessionManager {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Fetch the roster and replace the local copy.
    ///
    /// Safe to call repeatedly: records are normalized at the read
    /// boundary, so reloading is idempotent.  A signed-in identity is
    /// re-resolved against the fresh roster.
    pub async fn load_roster(&self) -> Result<Vec<User>> {
        let users = self.api.users().get_all().await?;

        let mut state = self.state.lock().await;
        if let Some(current) = &state.current {
            if let Some(fresh) = users.iter().find(|u| u.id == current.id) {
                state.current = Some(fresh.clone());
            }
        }
        state.users = users.clone();
        Ok(users)
    }

    /// The signed-in identity, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.state.lock().await.current.clone()
    }

    /// Snapshot of the loaded roster.
    pub async fn users(&self) -> Vec<User> {
        self.state.lock().await.users.clone()
    }

    /// Sign in as `user_id` with the PIN the user typed.
    ///
    /// PIN-less accounts sign in unconditionally.  An account whose PIN
    /// was never set gets it set to the entered value (first login); after
    /// that, the entered PIN must match the stored one exactly.  A
    /// mismatch changes no state, so the caller may retry.
    pub async fn authenticate(&self, user_id: &str, entered_pin: &str) -> Result<User> {
        let candidate = {
            let state = self.state.lock().await;
            state.users.iter().find(|u| u.id == user_id).cloned()
        }
        .ok_or_else(|| ClientError::UnknownUser(user_id.to_string()))?;

        if !candidate.requires_pin {
            info!(id = %candidate.id, "signed in without PIN");
            let mut state = self.state.lock().await;
            state.current = Some(candidate.clone());
            return Ok(candidate);
        }

        match &candidate.pin {
            // First login: persist the entered value as the PIN, then
            // commit roster and identity from the store's record.
            None => {
                let updated = self.api.users().update_pin(user_id, entered_pin).await?;
                info!(id = %updated.id, "first login, PIN set");
                let mut state = self.state.lock().await;
                replace_in_roster(&mut state.users, &updated);
                state.current = Some(updated.clone());
                Ok(updated)
            }
            Some(pin) if pin == entered_pin => {
                info!(id = %candidate.id, "signed in");
                let mut state = self.state.lock().await;
                state.current = Some(candidate.clone());
                Ok(candidate)
            }
            Some(_) => Err(ClientError::InvalidPin),
        }
    }

    /// Clear the signed-in identity.  Purely local, no network effect.
    pub async fn logout(&self) {
        let mut state = self.state.lock().await;
        if let Some(user) = state.current.take() {
            info!(id = %user.id, "signed out");
        }
    }

    /// Change the signed-in user's own PIN, then refresh the roster.
    pub async fn update_own_pin(&self, new_pin: &str) -> Result<()> {
        let current = self.current_user().await.ok_or(ClientError::NotSignedIn)?;
        self.api.users().update_pin(&current.id, new_pin).await?;
        self.load_roster().await?;
        Ok(())
    }

    /// Administrator: set another user's PIN, then refresh the roster.
    pub async fn update_user_pin(&self, user_id: &str, new_pin: &str) -> Result<()> {
        self.require_admin().await?;
        self.api.users().update_pin(user_id, new_pin).await?;
        info!(id = %user_id, "PIN reset");
        self.load_roster().await?;
        Ok(())
    }

    /// Administrator: grant or revoke one tab for a user.
    ///
    /// The full resulting set is sent to the store, never a diff, and the
    /// roster is patched only after the store confirms.  An account with
    /// no stored set starts from empty here: granting its first explicit
    /// tab switches it to restricted mode.
    pub async fn set_access(&self, user_id: &str, tab: Tab, enabled: bool) -> Result<()> {
        self.require_admin().await?;
        let target = {
            let state = self.state.lock().await;
            state.users.iter().find(|u| u.id == user_id).cloned()
        }
        .ok_or_else(|| ClientError::UnknownUser(user_id.to_string()))?;

        let mut tabs = target.accessible_tabs.unwrap_or_default();
        if enabled {
            if !tabs.contains(&tab) {
                tabs.push(tab);
            }
        } else {
            tabs.retain(|t| *t != tab);
        }

        let updated = self.api.users().update_access(user_id, &tabs).await?;
        info!(id = %user_id, tabs = tabs.len(), "tab access updated");
        let mut state = self.state.lock().await;
        replace_in_roster(&mut state.users, &updated);
        Ok(())
    }

    /// Administrator: create an account.  The store assigns the id, so
    /// the roster is reloaded rather than patched locally.
    pub async fn create_user(&self, name: &str, role: &str) -> Result<User> {
        self.require_admin().await?;
        let user = self
            .api
            .users()
            .create(&NewUser {
                name: name.to_string(),
                role: role.to_string(),
            })
            .await?;
        info!(id = %user.id, "user created");
        self.load_roster().await?;
        Ok(user)
    }

    /// Administrator: delete an account, then reload the roster.
    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.require_admin().await?;
        self.api.users().delete(user_id).await?;
        info!(id = %user_id, "user deleted");
        self.load_roster().await?;
        Ok(())
    }

    async fn require_admin(&self) -> Result<User> {
        let current = self.current_user().await.ok_or(ClientError::NotSignedIn)?;
        if !current.is_admin() {
            return Err(ClientError::Forbidden);
        }
        Ok(current)
    }
}

fn replace_in_roster(users: &mut [User], updated: &User) {
    if let Some(slot) = users.iter_mut().find(|u| u.id == updated.id) {
        *slot = updated.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_user, spawn_store};
    use serde_json::json;

    #[tokio::test]
    async fn test_pin_mismatch_fails_and_changes_nothing() {
        let store = spawn_store().await;
        store
            .put(
                "user:admin",
                json!({
                    "id": "admin",
                    "name": "Admin",
                    "role": "Lead",
                    "pin": "2703",
                    "requiresPin": true
                }),
            )
            .await;

        let session = SessionManager::new(store.client());
        session.load_roster().await.unwrap();

        let err = session.authenticate("admin", "0000").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidPin));
        assert!(session.current_user().await.is_none());
        // Roster untouched by the failed attempt.
        assert_eq!(session.users().await[0].pin.as_deref(), Some("2703"));

        let user = session.authenticate("admin", "2703").await.unwrap();
        assert_eq!(user.id, "admin");
        assert_eq!(session.current_user().await.unwrap().id, "admin");
    }

    #[tokio::test]
    async fn test_first_login_sets_the_pin_and_later_logins_must_match() {
        let store = spawn_store().await;
        seed_user(&store, "u1", "Ada", None).await;

        let session = SessionManager::new(store.client());
        session.load_roster().await.unwrap();

        // Any first value succeeds and is persisted.
        let user = session.authenticate("u1", "4321").await.unwrap();
        assert_eq!(user.pin.as_deref(), Some("4321"));
        assert_eq!(
            store.get("user:u1").await.unwrap()["pin"],
            json!("4321"),
            "entered PIN must be persisted remotely"
        );

        session.logout().await;
        assert!(session.current_user().await.is_none());

        let err = session.authenticate("u1", "9999").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidPin));
        session.authenticate("u1", "4321").await.unwrap();
    }

    #[tokio::test]
    async fn test_pinless_account_signs_in_with_anything() {
        let store = spawn_store().await;
        store
            .put(
                "user:guest",
                json!({
                    "id": "guest",
                    "name": "Guest",
                    "role": "Guest",
                    "pin": "",
                    "requiresPin": false,
                    "accessibleTabs": ["resources"]
                }),
            )
            .await;

        let session = SessionManager::new(store.client());
        session.load_roster().await.unwrap();

        let user = session.authenticate("guest", "").await.unwrap();
        assert!(!user.requires_pin);
        // The empty stored pin reads back as unset.
        assert_eq!(user.pin, None);
    }

    #[tokio::test]
    async fn test_set_access_sends_the_full_set_and_commits_after_success() {
        let store = spawn_store().await;
        seed_user(&store, "admin", "Admin", Some("1111")).await;
        store
            .put(
                "user:u1",
                json!({
                    "id": "u1",
                    "name": "Ada",
                    "role": "Engineer",
                    "accessibleTabs": ["logs"]
                }),
            )
            .await;

        let session = SessionManager::new(store.client());
        session.load_roster().await.unwrap();
        session.authenticate("admin", "1111").await.unwrap();

        session.set_access("u1", Tab::Wiki, true).await.unwrap();
        assert_eq!(
            store.get("user:u1").await.unwrap()["accessibleTabs"],
            json!(["logs", "wiki"]),
            "the store receives the full recomputed set"
        );

        session.set_access("u1", Tab::Logs, false).await.unwrap();
        let roster = session.users().await;
        let u1 = roster.iter().find(|u| u.id == "u1").unwrap();
        assert_eq!(u1.accessible_tabs, Some(vec![Tab::Wiki]));
    }

    #[tokio::test]
    async fn test_admin_only_operations_are_gated() {
        let store = spawn_store().await;
        seed_user(&store, "u1", "Ada", Some("1111")).await;

        let session = SessionManager::new(store.client());
        session.load_roster().await.unwrap();

        // Signed out entirely.
        let err = session.create_user("Eve", "Engineer").await.unwrap_err();
        assert!(matches!(err, ClientError::NotSignedIn));

        session.authenticate("u1", "1111").await.unwrap();
        let err = session.delete_user("someone").await.unwrap_err();
        assert!(matches!(err, ClientError::Forbidden));
        let err = session.update_user_pin("someone", "0000").await.unwrap_err();
        assert!(matches!(err, ClientError::Forbidden));
    }

    #[tokio::test]
    async fn test_create_and_delete_user_reload_the_roster() {
        let store = spawn_store().await;
        seed_user(&store, "admin", "Admin", Some("1111")).await;

        let session = SessionManager::new(store.client());
        session.load_roster().await.unwrap();
        session.authenticate("admin", "1111").await.unwrap();

        let created = session.create_user("Ada Lovelace", "Engineer").await.unwrap();
        assert!(created.id.starts_with("ada-lovelace-"));
        assert!(session.users().await.iter().any(|u| u.id == created.id));

        session.delete_user(&created.id).await.unwrap();
        assert!(!session.users().await.iter().any(|u| u.id == created.id));
        assert!(store.get(&format!("user:{}", created.id)).await.is_none());
    }

    #[tokio::test]
    async fn test_own_pin_update_refreshes_identity() {
        let store = spawn_store().await;
        seed_user(&store, "u1", "Ada", Some("1111")).await;

        let session = SessionManager::new(store.client());
        session.load_roster().await.unwrap();
        session.authenticate("u1", "1111").await.unwrap();

        session.update_own_pin("2222").await.unwrap();
        assert_eq!(
            session.current_user().await.unwrap().pin.as_deref(),
            Some("2222")
        );
    }
}
