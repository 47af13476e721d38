//! Credential types for one authenticated session.

use serde::{Deserialize, Serialize};

/// Role name the backend assigns to administrator accounts
const ADMIN_ROLE: &str = "admin";

/// Identity payload attached to the session.
///
/// Carried for display and for hiding admin-only surfaces locally; actual
/// authorization stays on the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Role name, e.g. "admin" or "employee"
    pub user: String,
    pub user_info: UserInfo,
}

impl Subject {
    pub fn is_admin(&self) -> bool {
        self.user.eq_ignore_ascii_case(ADMIN_ROLE)
    }

    /// Name for display, falling back to the numeric account id.
    pub fn display_name(&self) -> String {
        self.user_info
            .username
            .clone()
            .unwrap_or_else(|| format!("user #{}", self.user_info.id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// One authenticated session: both tokens plus the subject.
///
/// The serialized form is the session file layout:
/// `{token, refresh, user, user_info}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "token")]
    pub access_token: String,
    #[serde(rename = "refresh")]
    pub refresh_token: String,
    #[serde(flatten)]
    pub subject: Subject,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(role: &str) -> Subject {
        Subject {
            user: role.to_string(),
            user_info: UserInfo {
                id: 7,
                username: Some("alice".to_string()),
                email: None,
                first_name: None,
                last_name: None,
            },
        }
    }

    #[test]
    fn test_is_admin() {
        assert!(subject("admin").is_admin());
        assert!(subject("Admin").is_admin());
        assert!(!subject("employee").is_admin());
        assert!(!subject("").is_admin());
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let mut s = subject("employee");
        assert_eq!(s.display_name(), "alice");
        s.user_info.username = None;
        assert_eq!(s.display_name(), "user #7");
    }

    #[test]
    fn test_credential_serialized_layout() {
        let credential = Credential {
            access_token: "A1".to_string(),
            refresh_token: "R1".to_string(),
            subject: subject("employee"),
        };

        let json = serde_json::to_value(&credential).unwrap();
        assert_eq!(json["token"], "A1");
        assert_eq!(json["refresh"], "R1");
        assert_eq!(json["user"], "employee");
        assert_eq!(json["user_info"]["id"], 7);

        let back: Credential = serde_json::from_value(json).unwrap();
        assert_eq!(back, credential);
    }

    #[test]
    fn test_user_info_tolerates_sparse_payload() {
        let info: UserInfo = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(info.id, 7);
        assert!(info.username.is_none());
        assert!(info.email.is_none());
    }
}
