//! Keyword-based category suggestion
//!
//! Suggests a category for new expenses by scanning the description and
//! vendor name for known keywords. Groups are checked in a fixed order and
//! the first group with any hit wins, so overlapping keywords resolve
//! deterministically. Anything unmatched falls through to Uncategorized
//! with low confidence.

use crate::models::CategorySuggestion;

/// Seeded system category ids the categorizer maps to
/// (see `Database::seed_categories`)
pub const CATEGORY_FOOD: i64 = 1;
pub const CATEGORY_TRANSPORT: i64 = 2;
pub const CATEGORY_SHOPPING: i64 = 3;
pub const CATEGORY_UNCATEGORIZED: i64 = 9;

const FOOD_KEYWORDS: &[&str] = &[
    "restaurant",
    "cafe",
    "grocery",
    "food",
    "lunch",
    "dinner",
    "breakfast",
    "starbucks",
    "mcdonalds",
];

const TRANSPORT_KEYWORDS: &[&str] = &["uber", "taxi", "gas", "fuel", "metro", "bus", "train"];

const SHOPPING_KEYWORDS: &[&str] = &["amazon", "mall", "store", "shop", "buy", "purchase"];

/// Suggest a category for an expense
///
/// Matching is case-insensitive substring containment against either the
/// description or the vendor name. Callers should only invoke this when
/// the user did not pick a category themselves.
pub fn suggest_category(description: &str, vendor_name: Option<&str>) -> CategorySuggestion {
    let description = description.to_lowercase();
    let vendor = vendor_name.unwrap_or_default().to_lowercase();

    let matches = |keywords: &[&str]| {
        keywords
            .iter()
            .any(|k| description.contains(k) || vendor.contains(k))
    };

    if matches(FOOD_KEYWORDS) {
        CategorySuggestion {
            category_id: CATEGORY_FOOD,
            confidence: 0.85,
        }
    } else if matches(TRANSPORT_KEYWORDS) {
        CategorySuggestion {
            category_id: CATEGORY_TRANSPORT,
            confidence: 0.80,
        }
    } else if matches(SHOPPING_KEYWORDS) {
        CategorySuggestion {
            category_id: CATEGORY_SHOPPING,
            confidence: 0.75,
        }
    } else {
        CategorySuggestion {
            category_id: CATEGORY_UNCATEGORIZED,
            confidence: 0.30,
        }
    }
}
