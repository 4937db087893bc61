//! Startup seeding of the reserved accounts.
//!
//! Ensures the administrator and a PIN-less guest exist, and backfills
//! the access-control fields on copies of those accounts written before
//! the fields existed.  Runs on every start; a second run is a no-op.

use serde_json::{json, Value};
use tracing::info;

use draftboard_store::Database;

use crate::config::ServerConfig;
use crate::error::ServerError;

pub fn ensure_defaults(db: &Database, config: &ServerConfig) -> Result<(), ServerError> {
    // The admin is seeded without a PIN so the first sign-in sets it.
    let defaults = [
        json!({
            "id": "admin",
            "name": config.admin_name,
            "role": config.admin_role,
            "requiresPin": true,
            "accessibleTabs": ["wiki", "logs", "resources"],
        }),
        json!({
            "id": "guest",
            "name": "Guest User",
            "role": "Guest",
            "pin": "",
            "requiresPin": false,
            "accessibleTabs": ["resources"],
        }),
    ];

    for default in defaults {
        let id = default["id"].as_str().unwrap_or_default();
        let key = format!("user:{id}");

        match db.kv_get(&key)? {
            None => {
                db.kv_set(&key, &default)?;
                info!(id = %id, "seeded default user");
            }
            Some(mut existing) => {
                if backfill(&mut existing, &default) {
                    db.kv_set(&key, &existing)?;
                    info!(id = %id, "backfilled access fields on existing user");
                }
            }
        }
    }

    Ok(())
}

/// Copy `requiresPin`/`accessibleTabs` from the seed record onto an
/// existing record that predates them.  Returns whether anything changed.
fn backfill(existing: &mut Value, default: &Value) -> bool {
    let Some(obj) = existing.as_object_mut() else {
        return false;
    };

    let mut changed = false;
    for field in ["requiresPin", "accessibleTabs"] {
        if !obj.contains_key(field) {
            obj.insert(field.to_string(), default[field].clone());
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_db() -> (Database, ServerConfig) {
        let db = Database::open_in_memory().unwrap();
        let config = ServerConfig::default();
        (db, config)
    }

    #[test]
    fn test_fresh_database_gets_both_accounts() {
        let (db, config) = seeded_db();
        ensure_defaults(&db, &config).unwrap();

        let admin = db.kv_get("user:admin").unwrap().unwrap();
        assert_eq!(admin["name"], "Admin");
        assert!(admin.get("pin").is_none(), "admin PIN is set on first login");
        assert_eq!(admin["accessibleTabs"], json!(["wiki", "logs", "resources"]));

        let guest = db.kv_get("user:guest").unwrap().unwrap();
        assert_eq!(guest["requiresPin"], false);
        assert_eq!(guest["accessibleTabs"], json!(["resources"]));
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let (db, config) = seeded_db();
        ensure_defaults(&db, &config).unwrap();
        let before = db.kv_get("user:admin").unwrap();

        ensure_defaults(&db, &config).unwrap();
        assert_eq!(db.kv_get("user:admin").unwrap(), before);
    }

    #[test]
    fn test_existing_account_keeps_its_pin_and_gains_missing_fields() {
        let (db, config) = seeded_db();
        db.kv_set(
            "user:admin",
            &json!({ "id": "admin", "name": "Rahul", "role": "Lead", "pin": "2703" }),
        )
        .unwrap();

        ensure_defaults(&db, &config).unwrap();

        let admin = db.kv_get("user:admin").unwrap().unwrap();
        assert_eq!(admin["pin"], "2703", "stored PIN survives seeding");
        assert_eq!(admin["name"], "Rahul", "stored profile survives seeding");
        assert_eq!(admin["requiresPin"], true);
        assert_eq!(admin["accessibleTabs"], json!(["wiki", "logs", "resources"]));
    }
}
