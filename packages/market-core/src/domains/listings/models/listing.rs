use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{CategoryId, ListingId, ProfileId};

/// Listing - a resident-published service offer or property ad, subject to
/// admin moderation before public display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub owner: ProfileId,

    pub kind: ListingKind,
    /// Service category. Properties carry no category.
    pub category: Option<CategoryId>,

    // Content
    pub title: String,
    pub description: String,
    /// Digits-only `<country><area><number>` WhatsApp contact.
    pub whatsapp: String,

    // Moderation
    pub status: ListingStatus,
    pub rejection_reason: Option<String>,

    /// Present for `ListingKind::Property` only.
    pub property: Option<PropertyDetails>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Property-specific fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDetails {
    pub deal: Deal,
    /// Free text ("R$ 450.000", "a combinar").
    pub price: String,
    pub bedrooms: i32,
    pub garage_covered: bool,
    pub is_renovated: bool,
}

// =============================================================================
// Enums
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    Service,
    Property,
}

impl std::fmt::Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingKind::Service => write!(f, "service"),
            ListingKind::Property => write!(f, "property"),
        }
    }
}

impl std::str::FromStr for ListingKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "service" => Ok(ListingKind::Service),
            "property" => Ok(ListingKind::Property),
            _ => Err(anyhow::anyhow!("Invalid listing kind: {}", s)),
        }
    }
}

/// Moderation status. All three states are mutually reachable through
/// admin transitions; there is no terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingStatus::Pending => write!(f, "pending"),
            ListingStatus::Approved => write!(f, "approved"),
            ListingStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ListingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(ListingStatus::Pending),
            "approved" => Ok(ListingStatus::Approved),
            "rejected" => Ok(ListingStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid listing status: {}", s)),
        }
    }
}

/// Deal type for property listings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Deal {
    Venda,
    Aluguel,
}

impl std::fmt::Display for Deal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Deal::Venda => write!(f, "venda"),
            Deal::Aluguel => write!(f, "aluguel"),
        }
    }
}

impl std::str::FromStr for Deal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "venda" => Ok(Deal::Venda),
            "aluguel" => Ok(Deal::Aluguel),
            _ => Err(anyhow::anyhow!("Invalid deal type: {}", s)),
        }
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Submission payload. New listings always start `Pending`; the owner and
/// timestamps are assigned by the operation, never by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    pub owner: ProfileId,
    pub kind: ListingKind,
    pub category: Option<CategoryId>,
    pub title: String,
    pub description: String,
    pub whatsapp: String,
    pub property: Option<PropertyDetails>,
}

/// Owner-editable content fields. Status and rejection reason are never
/// part of a patch; they move only through the moderation state machine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub whatsapp: Option<String>,
    pub category: Option<Option<CategoryId>>,
    pub property: Option<PropertyDetails>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.whatsapp.is_none()
            && self.category.is_none()
            && self.property.is_none()
    }
}
