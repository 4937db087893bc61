//! Read-boundary normalization of raw store records.
//!
//! The remote store applies no schema: records written by old revisions of
//! the dashboard are still served verbatim.  Instead of patching shapes ad
//! hoc at every call site, each read path funnels raw JSON through exactly
//! one of the functions here, so the rules live in one place and repeated
//! application is a no-op.
//!
//! Current rules:
//! * logs: the retired free-text `tags` field is dropped and `linkedLogIds`
//!   always decodes as a set (the old tag values were labels, not log ids,
//!   so there is nothing to carry over);
//! * users: `requiresPin` is backfilled to `true`, an empty-string `pin`
//!   counts as unset, and `accessibleTabs` entries naming retired feature
//!   areas are dropped.

use serde_json::Value;

use crate::models::{DesignLog, Tab, User};

/// Normalize one raw log record and decode it.
pub fn normalize_log(mut raw: Value) -> serde_json::Result<DesignLog> {
    patch_log(&mut raw);
    serde_json::from_value(raw)
}

/// Normalize one raw user record and decode it.
pub fn normalize_user(mut raw: Value) -> serde_json::Result<User> {
    patch_user(&mut raw);
    serde_json::from_value(raw)
}

fn patch_log(raw: &mut Value) {
    let Some(obj) = raw.as_object_mut() else {
        return;
    };
    obj.remove("tags");
    match obj.get("linkedLogIds") {
        None | Some(Value::Null) => {
            obj.insert("linkedLogIds".to_string(), Value::Array(Vec::new()));
        }
        _ => {}
    }
}

fn patch_user(raw: &mut Value) {
    let Some(obj) = raw.as_object_mut() else {
        return;
    };
    // Records created before PIN enforcement existed get the strict default.
    if !obj.contains_key("requiresPin") {
        obj.insert("requiresPin".to_string(), Value::Bool(true));
    }
    // An empty-string pin is how early revisions spelled "not set yet".
    if obj.get("pin").is_some_and(|p| p.as_str() == Some("")) {
        obj.remove("pin");
    }
    if let Some(Value::Array(tabs)) = obj.get_mut("accessibleTabs") {
        tabs.retain(known_tab);
    }
}

fn known_tab(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| Tab::ALL.iter().any(|t| t.as_str() == s))
}
