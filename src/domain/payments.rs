use crate::core::{CondoError, Period, Result};
use crate::optimistic::{Keyed, Patchable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Late,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Paid => "paid",
            Self::Pending => "pending",
            Self::Late => "late",
        };
        write!(f, "{label}")
    }
}

impl FromStr for PaymentStatus {
    type Err = CondoError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(Self::Paid),
            "pending" => Ok(Self::Pending),
            "late" => Ok(Self::Late),
            _ => Err(CondoError::validation(format!(
                "unknown payment status '{raw}'"
            ))),
        }
    }
}

/// One cell of the payment grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_cents: Option<u64>,
}

impl PaymentEntry {
    pub fn pending() -> Self {
        Self {
            status: PaymentStatus::Pending,
            amount_cents: None,
        }
    }

    pub fn paid(amount_cents: u64) -> Self {
        Self {
            status: PaymentStatus::Paid,
            amount_cents: Some(amount_cents),
        }
    }

    pub fn late() -> Self {
        Self {
            status: PaymentStatus::Late,
            amount_cents: None,
        }
    }

    /// Entry recorded when an apartment with `monthly_quota_cents` moves to
    /// `status`. Only a paid quota carries an amount.
    pub fn for_status(status: PaymentStatus, monthly_quota_cents: u64) -> Self {
        match status {
            PaymentStatus::Paid => Self::paid(monthly_quota_cents),
            PaymentStatus::Pending => Self::pending(),
            PaymentStatus::Late => Self::late(),
        }
    }
}

/// A grid row: one apartment and its payments for a single year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApartmentPayments {
    pub id: Uuid,
    pub building_id: Uuid,
    pub unit: String,
    pub monthly_quota_cents: u64,
    pub year: i32,
    #[serde(default)]
    pub payments: BTreeMap<u8, PaymentEntry>,
}

impl ApartmentPayments {
    pub fn new(
        id: Uuid,
        building_id: Uuid,
        unit: impl Into<String>,
        monthly_quota_cents: u64,
        year: i32,
    ) -> Self {
        Self {
            id,
            building_id,
            unit: unit.into(),
            monthly_quota_cents,
            year,
            payments: BTreeMap::new(),
        }
    }

    pub fn entry(&self, month: u8) -> Option<&PaymentEntry> {
        self.payments.get(&month)
    }

    /// Months without a record count as pending.
    pub fn status(&self, month: u8) -> PaymentStatus {
        self.entry(month)
            .map(|entry| entry.status)
            .unwrap_or(PaymentStatus::Pending)
    }

    pub fn entry_for_status(&self, status: PaymentStatus) -> PaymentEntry {
        PaymentEntry::for_status(status, self.monthly_quota_cents)
    }
}

/// Speculative change of one (apartment, month) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPatch {
    pub period: Period,
    pub entry: PaymentEntry,
}

impl Keyed for ApartmentPayments {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}

impl Patchable for ApartmentPayments {
    type Patch = PaymentPatch;

    fn apply_patch(&mut self, patch: &PaymentPatch) {
        if patch.period.year != self.year {
            return;
        }
        self.payments.insert(patch.period.month, patch.entry);
    }

    fn patch_period(patch: &PaymentPatch) -> Option<Period> {
        Some(patch.period)
    }
}

/// Per-month totals shown under the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MonthSummary {
    pub paid: usize,
    pub pending: usize,
    pub late: usize,
    pub collected_cents: u64,
}

impl MonthSummary {
    pub fn from_rows<'a, I>(rows: I, month: u8) -> Self
    where
        I: IntoIterator<Item = &'a ApartmentPayments>,
    {
        rows.into_iter().fold(Self::default(), |mut summary, row| {
            match row.status(month) {
                PaymentStatus::Paid => {
                    summary.paid += 1;
                    summary.collected_cents += row
                        .entry(month)
                        .and_then(|entry| entry.amount_cents)
                        .unwrap_or(0);
                }
                PaymentStatus::Pending => summary.pending += 1,
                PaymentStatus::Late => summary.late += 1,
            }
            summary
        })
    }
}
