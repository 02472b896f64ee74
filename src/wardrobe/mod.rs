//! Wardrobe Domain Documents
//!
//! The documents the application stores per user:
//!
//! - **profile**: display data, style preferences and measurements
//! - **item**: wardrobe items with wear counters and cost-per-wear
//! - **subscription**: billing tier mirrored from the payments platform
//! - **outfit**: outfit history entries and individual wear events
//! - **warnings**: display formatting for outfit warnings
//! - **csv_io**: bulk item import and CSV export

pub mod csv_io;
pub mod item;
pub mod outfit;
pub mod profile;
pub mod subscription;
pub mod warnings;

pub use csv_io::{items_to_csv, ImportError, ImportResult, ItemCsvImporter};
pub use item::{cost_per_wear, normalize_color, ItemCategory, ItemPatch, WardrobeItem};
pub use outfit::{OutfitEntry, WearEvent, MAX_OUTFIT_ITEMS};
pub use profile::{Measurements, Preferences, ProfilePatch, UserProfile};
pub use subscription::{Subscription, SubscriptionStatus, Tier, TierLimits};
pub use warnings::{format_warnings, OutfitWarning};

/// A field-level validation failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct Validation {
    pub field: &'static str,
    pub message: String,
}

impl Validation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Result type for document validation
pub type ValidationResult<T> = Result<T, Validation>;
