//! Income/expense ledger records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub kind: LedgerKind,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
}

impl LedgerEntry {
    /// Amount with expenses negated, for running totals.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            LedgerKind::Income => self.amount,
            LedgerKind::Expense => -self.amount,
        }
    }
}

/// Payload for adding a ledger entry.
#[derive(Debug, Clone, Serialize)]
pub struct NewLedgerEntry {
    pub kind: LedgerKind,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Totals over a set of ledger entries, computed client-side for display.
#[derive(Debug, Default, PartialEq)]
pub struct LedgerSummary {
    pub income: f64,
    pub expense: f64,
}

impl LedgerSummary {
    pub fn of(entries: &[LedgerEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            match entry.kind {
                LedgerKind::Income => summary.income += entry.amount,
                LedgerKind::Expense => summary.expense += entry.amount,
            }
        }
        summary
    }

    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: LedgerKind, amount: f64) -> LedgerEntry {
        LedgerEntry {
            id: 1,
            kind,
            amount,
            category: "office".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            note: None,
        }
    }

    #[test]
    fn test_signed_amount() {
        assert_eq!(entry(LedgerKind::Income, 1200.0).signed_amount(), 1200.0);
        assert_eq!(entry(LedgerKind::Expense, 300.5).signed_amount(), -300.5);
    }

    #[test]
    fn test_summary_totals() {
        let entries = vec![
            entry(LedgerKind::Income, 1000.0),
            entry(LedgerKind::Income, 250.0),
            entry(LedgerKind::Expense, 400.0),
        ];

        let summary = LedgerSummary::of(&entries);
        assert_eq!(summary.income, 1250.0);
        assert_eq!(summary.expense, 400.0);
        assert_eq!(summary.net(), 850.0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = LedgerSummary::of(&[]);
        assert_eq!(summary, LedgerSummary::default());
        assert_eq!(summary.net(), 0.0);
    }

    #[test]
    fn test_kind_wire_format() {
        assert_eq!(
            serde_json::to_string(&LedgerKind::Expense).unwrap(),
            r#""expense""#
        );
    }
}
