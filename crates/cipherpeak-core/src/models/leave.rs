//! Leave application records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveApplication {
    pub id: i64,
    /// Employee id the application belongs to
    pub employee: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
}

impl LeaveApplication {
    /// Number of calendar days requested, inclusive of both ends.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn is_pending(&self) -> bool {
        self.status == LeaveStatus::Pending
    }
}

/// Payload for submitting a leave application. The employee is implied by
/// the session.
#[derive(Debug, Clone, Serialize)]
pub struct NewLeave {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leave(start: (i32, u32, u32), end: (i32, u32, u32)) -> LeaveApplication {
        LeaveApplication {
            id: 1,
            employee: 12,
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            reason: "family visit".to_string(),
            status: LeaveStatus::Pending,
        }
    }

    #[test]
    fn test_days_is_inclusive() {
        assert_eq!(leave((2026, 8, 10), (2026, 8, 10)).days(), 1);
        assert_eq!(leave((2026, 8, 10), (2026, 8, 14)).days(), 5);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&LeaveStatus::Approved).unwrap(),
            r#""approved""#
        );
        let parsed: LeaveStatus = serde_json::from_str(r#""rejected""#).unwrap();
        assert_eq!(parsed, LeaveStatus::Rejected);
    }
}
