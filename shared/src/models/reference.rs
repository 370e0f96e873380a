//! Reference data used to populate form selects

use serde::{Deserialize, Serialize};

/// Kind of static reference list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Branches,
    Ports,
    ShippingMethods,
    Statuses,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 4] = [
        Self::Branches,
        Self::Ports,
        Self::ShippingMethods,
        Self::Statuses,
    ];

    /// API path segment under `/api/reference`
    pub fn path(&self) -> &'static str {
        match self {
            Self::Branches => "branches",
            Self::Ports => "ports",
            Self::ShippingMethods => "shipping-methods",
            Self::Statuses => "statuses",
        }
    }
}

/// One selectable option (branch, port, method or status)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceOption {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
