//! Domain model structs exchanged with the remote store.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names so it maps 1:1 onto the JSON the REST API speaks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Reserved id of the privileged administrator account.
pub const ADMIN_USER_ID: &str = "admin";

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// Feature areas of the dashboard a user can be granted access to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Logs,
    Wiki,
    Resources,
}

impl Tab {
    /// Every feature area, in display order.
    pub const ALL: [Tab; 3] = [Tab::Logs, Tab::Wiki, Tab::Resources];

    /// Wire name of the tab, as stored in `accessibleTabs`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Logs => "logs",
            Tab::Wiki => "wiki",
            Tab::Resources => "resources",
        }
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A dashboard account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable string key; [`ADMIN_USER_ID`] is reserved for the administrator.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text role label shown next to the name.
    pub role: String,
    /// Short numeric secret; `None` until the first login sets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    /// PIN-less guest accounts set this to false.
    #[serde(default = "default_true")]
    pub requires_pin: bool,
    /// Tabs this user may open; `None` means unrestricted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessible_tabs: Option<Vec<Tab>>,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Whether this account is the reserved administrator identity.
    ///
    /// Gating is by id, not by the free-text `role` label, which is purely
    /// cosmetic and editable.
    pub fn is_admin(&self) -> bool {
        self.id == ADMIN_USER_ID
    }

    /// Whether this account may open the given tab.  The administrator
    /// always has full access regardless of the stored set; for everyone
    /// else an absent set means unrestricted.
    pub fn can_access(&self, tab: Tab) -> bool {
        if self.is_admin() {
            return true;
        }
        match &self.accessible_tabs {
            Some(tabs) => tabs.contains(&tab),
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Design log
// ---------------------------------------------------------------------------

/// A comment on a [`DesignLog`].  Immutable once created; the server stamps
/// id and date when it appends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    /// Display-name snapshot of the author at posting time.
    pub author: String,
    pub author_id: String,
    pub date: NaiveDate,
}

/// A journal entry.
///
/// Updates travel through a shallow merge on the server, so clearable
/// optionals (`category`, `imageUrl`, ...) always serialize, as explicit
/// nulls when unset.  Skipping them would make the server keep the old
/// value on a clearing edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DesignLog {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Calendar date of the entry, the timeline sort key.
    pub date: NaiveDate,
    /// Optional free-text tag used for filtering.
    #[serde(default)]
    pub category: Option<String>,
    /// Ids of related logs.  The relation is non-hierarchical and may
    /// contain cycles; neighbours are resolved against the loaded
    /// collection at display time.
    #[serde(default)]
    pub linked_log_ids: Vec<String>,
    /// Opaque reference to an uploaded image.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Owner of the entry.
    pub user_id: String,
    /// Append-only; insertion order is display order.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Soft-delete flag; deleted entries appear only in the trash view.
    #[serde(default)]
    pub deleted: bool,
    /// Set iff `deleted` is true.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A shared link in the resource library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub category: String,
    /// Display-name snapshot of the creator.
    pub added_by: String,
    pub added_by_id: String,
    pub added_date: DateTime<Utc>,
    /// True when the creator was the administrator.  Partitions the library
    /// into a team section and per-user personal sections.
    pub is_admin_resource: bool,
}

// ---------------------------------------------------------------------------
// Wiki
// ---------------------------------------------------------------------------

/// A comment on a [`WikiPage`].  Unlike log comments these are stamped by
/// the client and sent through the page-update path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WikiComment {
    pub id: String,
    pub text: String,
    pub author: String,
    pub author_id: String,
    pub date: DateTime<Utc>,
}

/// A wiki page.  Every edit refreshes `last_modified`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WikiPage {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Ordered opaque image references.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub comments: Vec<WikiComment>,
    pub created_by: String,
    pub created_by_name: String,
    pub last_modified: DateTime<Utc>,
}
