//! Employee records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub date_joined: Option<NaiveDate>,
}

impl Employee {
    /// Full name for display, falling back to the username.
    pub fn full_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => self.username.clone(),
        }
    }
}

/// Payload for creating or updating an employee.
#[derive(Debug, Clone, Serialize)]
pub struct NewEmployee {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_employee() {
        let json = r#"{
            "id": 12,
            "username": "bmartin",
            "first_name": "Beth",
            "last_name": "Martin",
            "email": "beth@cipherpeak.app",
            "designation": "Accountant",
            "date_joined": "2023-04-17"
        }"#;

        let employee: Employee = serde_json::from_str(json).expect("employee should parse");
        assert_eq!(employee.id, 12);
        assert_eq!(employee.full_name(), "Beth Martin");
        assert_eq!(employee.designation.as_deref(), Some("Accountant"));
        assert_eq!(
            employee.date_joined,
            NaiveDate::from_ymd_opt(2023, 4, 17)
        );
        assert!(employee.phone.is_none());
    }

    #[test]
    fn test_full_name_fallbacks() {
        let mut employee: Employee =
            serde_json::from_str(r#"{"id": 1, "username": "solo"}"#).unwrap();
        assert_eq!(employee.full_name(), "solo");

        employee.first_name = Some("Ana".to_string());
        assert_eq!(employee.full_name(), "Ana");

        employee.first_name = None;
        employee.last_name = Some("Silva".to_string());
        assert_eq!(employee.full_name(), "Silva");
    }
}
