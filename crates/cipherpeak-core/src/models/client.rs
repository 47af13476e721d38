//! Client (customer) records.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ClientRecord {
    /// "Name (Company)" when a company is known, otherwise just the name.
    pub fn display_label(&self) -> String {
        match self.company.as_deref() {
            Some(company) => format!("{} ({})", self.name, company),
            None => self.name.clone(),
        }
    }
}

/// Payload for creating a client.
#[derive(Debug, Clone, Serialize)]
pub struct NewClient {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label() {
        let mut client: ClientRecord =
            serde_json::from_str(r#"{"id": 3, "name": "Dana Reyes", "company": "Reyes & Co"}"#)
                .unwrap();
        assert_eq!(client.display_label(), "Dana Reyes (Reyes & Co)");

        client.company = None;
        assert_eq!(client.display_label(), "Dana Reyes");
    }
}
