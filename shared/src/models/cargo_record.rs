//! Cargo Record Model (待配载货物)

use chrono::{DateTime, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::RecordId;

/// Assignment state of a record in the remote pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentFlag {
    /// Available for a new manifest
    #[serde(rename = "FREE")]
    Free,
    /// Already attached to some manifest
    #[serde(rename = "USED")]
    Used,
}

impl AssignmentFlag {
    /// Value used in the pool query string
    pub fn as_query_value(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Used => "used",
        }
    }
}

impl Default for AssignmentFlag {
    fn default() -> Self {
        Self::Free
    }
}

/// Read-only snapshot of one shipment item held by the remote pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoRecord {
    pub id: RecordId,
    /// Bill number shown to the operator
    pub bill_reference: String,
    #[serde(default)]
    pub invoice_reference: Option<String>,
    #[serde(default)]
    pub booking_reference: Option<String>,
    #[serde(default)]
    pub piece_count: u32,
    /// Weight in kg; absent or non-numeric values deserialize to `None`
    #[serde(default, deserialize_with = "deserialize_weight")]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub shipping_method_label: Option<String>,
    #[serde(default)]
    pub destination_label: Option<String>,
    /// Creation time (Unix millis)
    pub created_at: i64,
    /// Lifecycle status label, e.g. "Pending", "Booked"
    #[serde(default)]
    pub lifecycle_status: String,
    pub assignment_flag: AssignmentFlag,
}

fn deserialize_weight<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(crate::util::lenient_decimal))
}

impl CargoRecord {
    /// Weight contribution to manifest totals (missing counts as zero)
    pub fn weight_or_zero(&self) -> Decimal {
        self.weight.unwrap_or(Decimal::ZERO)
    }

    pub fn is_free(&self) -> bool {
        self.assignment_flag == AssignmentFlag::Free
    }

    /// Case-insensitive substring match against bill, invoice and booking
    /// references. An empty needle matches everything.
    pub fn matches_reference(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        std::iter::once(self.bill_reference.as_str())
            .chain(self.invoice_reference.as_deref())
            .chain(self.booking_reference.as_deref())
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Calendar day of creation in the operator's local time zone
    pub fn created_on(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp_millis(self.created_at)
            .map(|utc| utc.with_timezone(&Local).date_naive())
    }

    pub fn has_status(&self, status: &str) -> bool {
        self.lifecycle_status.trim().eq_ignore_ascii_case(status.trim())
    }
}
