//! Display name resolution for the generated letter's voice.
//!
//! The letter addresses its subject by given name only. The full name and
//! raw handle are never injected into the prompt.

use crate::models::github::{ContributorInfo, GitHubUser};

pub const FALLBACK_DISPLAY_NAME: &str = "the developer";

/// Returns a human-readable first name.
///
/// 1. First whitespace-delimited token of `full_name`, when non-blank.
/// 2. Otherwise `github_username` verbatim, when non-blank.
/// 3. Otherwise [`FALLBACK_DISPLAY_NAME`].
pub fn extract_display_name(full_name: Option<&str>, github_username: Option<&str>) -> String {
    if let Some(first) = full_name.and_then(|n| n.split_whitespace().next()) {
        return first.to_string();
    }

    match github_username {
        Some(username) if !username.trim().is_empty() => username.to_string(),
        _ => FALLBACK_DISPLAY_NAME.to_string(),
    }
}

pub fn display_name_for_user(user: Option<&GitHubUser>) -> String {
    extract_display_name(
        user.and_then(|u| u.full_name.as_deref()),
        user.map(|u| u.github_username.as_str()),
    )
}

/// Contributor identity wins when present; the profile is the fallback.
pub fn display_name_for_contributor(
    contributor: Option<&ContributorInfo>,
    user: Option<&GitHubUser>,
) -> String {
    match contributor {
        Some(c) => extract_display_name(c.full_name.as_deref(), Some(c.username.as_str())),
        None => display_name_for_user(user),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_token_of_full_name() {
        assert_eq!(
            extract_display_name(Some("John Smith"), Some("johnsmith123")),
            "John"
        );
    }

    #[test]
    fn test_unicode_full_name() {
        assert_eq!(
            extract_display_name(Some("José María González"), None),
            "José"
        );
    }

    #[test]
    fn test_username_when_no_full_name() {
        assert_eq!(extract_display_name(None, Some("alexdev")), "alexdev");
    }

    #[test]
    fn test_blank_full_name_falls_through_to_username() {
        assert_eq!(extract_display_name(Some("   "), Some("alexdev")), "alexdev");
    }

    #[test]
    fn test_fallback_when_nothing_known() {
        assert_eq!(extract_display_name(None, None), "the developer");
        assert_eq!(extract_display_name(Some(""), Some("")), "the developer");
    }

    #[test]
    fn test_leading_whitespace_ignored() {
        assert_eq!(extract_display_name(Some("  Ada Lovelace"), None), "Ada");
    }

    #[test]
    fn test_contributor_identity_preferred() {
        let user = GitHubUser {
            github_username: "owner".to_string(),
            full_name: Some("Repo Owner".to_string()),
            ..Default::default()
        };
        let contributor = ContributorInfo {
            username: "mkim".to_string(),
            full_name: Some("Min Kim".to_string()),
            contributions: 12,
        };
        assert_eq!(
            display_name_for_contributor(Some(&contributor), Some(&user)),
            "Min"
        );
        assert_eq!(display_name_for_contributor(None, Some(&user)), "Repo");
    }
}
