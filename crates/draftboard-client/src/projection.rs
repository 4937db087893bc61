//! View projections: pure derivations over the raw collections.
//!
//! The presentation layer recomputes these whenever the identity, the
//! collection, or a filter/sort selection changes.  Nothing here mutates
//! state or talks to the network.

use draftboard_shared::{DesignLog, Resource, User, WikiPage};

/// Timeline sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

/// Category filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// No category filtering.
    #[default]
    All,
    /// Only logs tagged with exactly this category.
    Only(String),
}

/// The displayed timeline: the selected user's live logs, category
/// filtered and date sorted.
///
/// The sort is stable: logs sharing a date keep their relative order from
/// the input collection, so flipping [`SortOrder`] reverses exactly the
/// pairs with distinct dates and nothing else.
pub fn visible_logs(
    logs: &[DesignLog],
    selected_user: &str,
    filter: &CategoryFilter,
    order: SortOrder,
) -> Vec<DesignLog> {
    let mut out: Vec<DesignLog> = logs
        .iter()
        .filter(|log| log.user_id == selected_user && !log.deleted)
        .filter(|log| match filter {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => log.category.as_deref() == Some(category.as_str()),
        })
        .cloned()
        .collect();

    match order {
        SortOrder::Newest => out.sort_by(|a, b| b.date.cmp(&a.date)),
        SortOrder::Oldest => out.sort_by(|a, b| a.date.cmp(&b.date)),
    }
    out
}

/// Distinct non-empty categories among the selected user's live logs, in
/// first-seen order.
///
/// Categories are scoped per user, so this is recomputed whenever the
/// selected tab changes.
pub fn available_categories(logs: &[DesignLog], selected_user: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for log in logs
        .iter()
        .filter(|log| log.user_id == selected_user && !log.deleted)
    {
        if let Some(category) = log.category.as_deref() {
            if !category.is_empty() && !seen.iter().any(|s| s == category) {
                seen.push(category.to_string());
            }
        }
    }
    seen
}

/// The trash view: the identity's own soft-deleted logs, most recently
/// deleted first.
pub fn trash(logs: &[DesignLog], identity: &User) -> Vec<DesignLog> {
    let mut out: Vec<DesignLog> = logs
        .iter()
        .filter(|log| log.user_id == identity.id && log.deleted)
        .cloned()
        .collect();
    out.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
    out
}

/// Split the library into the shared team section (added by the
/// administrator) and the personal one.
pub fn partition_resources(resources: &[Resource]) -> (Vec<Resource>, Vec<Resource>) {
    resources
        .iter()
        .cloned()
        .partition(|resource| resource.is_admin_resource)
}

/// Case-insensitive title/content search over wiki pages.
pub fn search_pages(pages: &[WikiPage], query: &str) -> Vec<WikiPage> {
    if query.is_empty() {
        return pages.to_vec();
    }
    let needle = query.to_lowercase();
    pages
        .iter()
        .filter(|page| {
            page.title.to_lowercase().contains(&needle)
                || page.content.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn log(id: &str, user: &str, date: &str, category: Option<&str>) -> DesignLog {
        DesignLog {
            id: id.to_string(),
            title: format!("log {id}"),
            description: String::new(),
            date: date.parse::<NaiveDate>().unwrap(),
            category: category.map(str::to_string),
            linked_log_ids: vec![],
            image_url: None,
            user_id: user.to_string(),
            comments: vec![],
            deleted: false,
            deleted_at: None,
        }
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            name: id.to_string(),
            role: "Engineer".to_string(),
            pin: None,
            requires_pin: true,
            accessible_tabs: None,
        }
    }

    fn ids(logs: &[DesignLog]) -> Vec<&str> {
        logs.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn test_other_users_logs_never_appear() {
        let logs = vec![
            log("mine", "u1", "2024-01-01", None),
            log("theirs", "u2", "2024-01-02", None),
        ];
        let view = visible_logs(&logs, "u2", &CategoryFilter::All, SortOrder::Newest);
        assert_eq!(ids(&view), ["theirs"]);
    }

    #[test]
    fn test_deleted_logs_are_excluded_from_the_timeline() {
        let mut gone = log("gone", "u1", "2024-01-03", None);
        gone.deleted = true;
        let logs = vec![log("kept", "u1", "2024-01-01", None), gone];

        let view = visible_logs(&logs, "u1", &CategoryFilter::All, SortOrder::Newest);
        assert_eq!(ids(&view), ["kept"]);
    }

    #[test]
    fn test_category_filter_keeps_exact_matches_only() {
        let logs = vec![
            log("L1", "u1", "2024-01-01", Some("UX")),
            log("L2", "u1", "2024-02-01", Some("UI")),
        ];
        let view = visible_logs(
            &logs,
            "u1",
            &CategoryFilter::Only("UX".to_string()),
            SortOrder::Newest,
        );
        assert_eq!(ids(&view), ["L1"]);
    }

    #[test]
    fn test_sort_flip_reverses_distinct_dates_and_keeps_ties_stable() {
        // b and c share a date; their input order must survive both sorts.
        let logs = vec![
            log("a", "u1", "2024-03-01", None),
            log("b", "u1", "2024-01-15", None),
            log("c", "u1", "2024-01-15", None),
            log("d", "u1", "2024-02-01", None),
        ];

        let newest = visible_logs(&logs, "u1", &CategoryFilter::All, SortOrder::Newest);
        assert_eq!(ids(&newest), ["a", "d", "b", "c"]);

        let oldest = visible_logs(&logs, "u1", &CategoryFilter::All, SortOrder::Oldest);
        assert_eq!(ids(&oldest), ["b", "c", "d", "a"]);
    }

    #[test]
    fn test_available_categories_are_distinct_non_empty_and_scoped() {
        let logs = vec![
            log("L1", "u1", "2024-01-01", Some("UX")),
            log("L2", "u1", "2024-02-01", Some("UI")),
            log("L3", "u1", "2024-03-01", Some("UX")),
            log("L4", "u1", "2024-04-01", Some("")),
            log("L5", "u1", "2024-05-01", None),
            log("L6", "u2", "2024-06-01", Some("Research")),
        ];
        assert_eq!(available_categories(&logs, "u1"), ["UX", "UI"]);
        assert_eq!(available_categories(&logs, "u2"), ["Research"]);
    }

    #[test]
    fn test_categories_ignore_deleted_logs() {
        let mut gone = log("L1", "u1", "2024-01-01", Some("Retired"));
        gone.deleted = true;
        let logs = vec![gone, log("L2", "u1", "2024-02-01", Some("UX"))];
        assert_eq!(available_categories(&logs, "u1"), ["UX"]);
    }

    #[test]
    fn test_trash_holds_own_deleted_logs_newest_deletion_first() {
        let mut first = log("first", "u1", "2024-01-01", None);
        first.deleted = true;
        first.deleted_at = Some("2024-05-01T10:00:00Z".parse().unwrap());
        let mut second = log("second", "u1", "2024-01-02", None);
        second.deleted = true;
        second.deleted_at = Some("2024-05-02T10:00:00Z".parse().unwrap());
        let mut other = log("other", "u2", "2024-01-03", None);
        other.deleted = true;

        let logs = vec![first, other, second, log("live", "u1", "2024-01-04", None)];
        let view = trash(&logs, &user("u1"));
        assert_eq!(ids(&view), ["second", "first"]);
    }

    #[test]
    fn test_partition_splits_team_from_personal() {
        let team = Resource {
            id: "r1".into(),
            title: "Style guide".into(),
            url: "https://example.com".into(),
            description: String::new(),
            category: "Design".into(),
            added_by: "Admin".into(),
            added_by_id: "admin".into(),
            added_date: "2024-05-01T10:00:00Z".parse().unwrap(),
            is_admin_resource: true,
        };
        let personal = Resource {
            id: "r2".into(),
            is_admin_resource: false,
            added_by: "Ada".into(),
            added_by_id: "u1".into(),
            ..team.clone()
        };

        let (team_section, personal_section) = partition_resources(&[team, personal]);
        assert_eq!(team_section.len(), 1);
        assert_eq!(team_section[0].id, "r1");
        assert_eq!(personal_section.len(), 1);
        assert_eq!(personal_section[0].id, "r2");
    }

    #[test]
    fn test_page_search_is_case_insensitive_on_title_and_content() {
        let page = |id: &str, title: &str, content: &str| WikiPage {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            category: None,
            images: vec![],
            comments: vec![],
            created_by: "u1".into(),
            created_by_name: "Ada".into(),
            last_modified: "2024-05-01T10:00:00Z".parse().unwrap(),
        };
        let pages = vec![
            page("p1", "Onboarding", "How we work"),
            page("p2", "Design tokens", "Colors and SPACING rules"),
        ];

        assert_eq!(search_pages(&pages, "onboard").len(), 1);
        assert_eq!(search_pages(&pages, "spacing")[0].id, "p2");
        assert_eq!(search_pages(&pages, "").len(), 2);
        assert!(search_pages(&pages, "nothing").is_empty());
    }
}
