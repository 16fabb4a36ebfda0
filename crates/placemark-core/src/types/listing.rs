//! Listing payload and live record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain payload for a business listing.
///
/// The website is the natural key; everything else is descriptive content.
/// Equality is structural over all fields and order-sensitive for
/// `reviews` and `photos`, which is what the no-op check in `save` relies
/// on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Listing {
    pub name: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub reviews: Vec<String>,
    pub opening_hours: Option<String>,
    pub photos: Vec<String>,
}

impl Listing {
    /// Create a new listing with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set the address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Builder: set the phone number.
    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    /// Builder: set the website (the natural key).
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// Builder: set the rating.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Builder: append a review.
    pub fn with_review(mut self, review: impl Into<String>) -> Self {
        self.reviews.push(review.into());
        self
    }

    /// Builder: set the opening hours.
    pub fn with_opening_hours(mut self, opening_hours: impl Into<String>) -> Self {
        self.opening_hours = Some(opening_hours.into());
        self
    }

    /// Builder: append a photo reference.
    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photos.push(photo.into());
        self
    }

    /// The natural-key value, or `None` when the website is missing or
    /// blank.
    pub fn natural_key(&self) -> Option<&str> {
        self.website
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Bookkeeping carried by a live record, excluded from content comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    /// Starts at 1, advances by exactly one per accepted content change.
    pub current_version: u32,
    /// Set once at creation, immutable thereafter.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every state-changing write.
    pub updated_at: DateTime<Utc>,
}

impl RecordMeta {
    /// Bookkeeping for a freshly created record.
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            current_version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bookkeeping after one accepted content change.
    pub fn advanced(&self, now: DateTime<Utc>) -> Self {
        Self {
            current_version: self.current_version + 1,
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

/// The current state of one tracked listing.
///
/// The surrogate `id` is assigned by the store at creation and never
/// changes; `url_hash` is the identity digest used for deduplicating
/// lookups. The two are distinct on purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: String,
    #[serde(flatten)]
    pub listing: Listing,
    pub url_hash: String,
    pub meta: RecordMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let listing = Listing::new("Cafe Good Vibes")
            .with_address("123 Coffee St")
            .with_website("http://cafegoodvibes.com")
            .with_rating(4.5)
            .with_review("Great place!");

        assert_eq!(listing.name, "Cafe Good Vibes");
        assert_eq!(listing.rating, Some(4.5));
        assert_eq!(listing.reviews, vec!["Great place!".to_string()]);
        assert_eq!(listing.natural_key(), Some("http://cafegoodvibes.com"));
    }

    #[test]
    fn test_natural_key_rejects_blank_website() {
        assert_eq!(Listing::new("No Site").natural_key(), None);
        assert_eq!(
            Listing::new("Blank Site").with_website("   ").natural_key(),
            None
        );
    }

    #[test]
    fn test_equality_is_order_sensitive_for_arrays() {
        let a = Listing::new("Cafe").with_review("one").with_review("two");
        let b = Listing::new("Cafe").with_review("two").with_review("one");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_serde_field_names_match_document_layout() {
        let listing = Listing::new("Cafe")
            .with_phone_number("555-1234")
            .with_opening_hours("8am - 8pm");
        let value = serde_json::to_value(&listing).unwrap();

        assert!(value.get("phoneNumber").is_some());
        assert!(value.get("openingHours").is_some());
        assert!(value.get("phone_number").is_none());
    }

    #[test]
    fn test_meta_advanced_preserves_creation_time() {
        let created = Utc::now();
        let meta = RecordMeta::initial(created);
        assert_eq!(meta.current_version, 1);

        let later = created + chrono::Duration::minutes(5);
        let advanced = meta.advanced(later);
        assert_eq!(advanced.current_version, 2);
        assert_eq!(advanced.created_at, created);
        assert_eq!(advanced.updated_at, later);
    }
}
