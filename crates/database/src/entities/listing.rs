//! Listing entity and the shapes used to create, update, and search it.

use serde::Serialize;

/// A marketplace listing. Always carries a valid owner reference.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Listing {
    #[serde(skip_serializing)]
    pub id: i64,
    pub public_id: String,
    #[serde(skip_serializing)]
    pub owner_id: i64,
    pub title: String,
    pub location: String,
    pub technology: String,
    pub description: String,
    pub price: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields supplied when creating a listing. The owner comes from the
/// authenticated session, never from the payload.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub location: String,
    pub technology: String,
    pub description: String,
    pub price: i64,
}

/// Full-field replacement for an existing listing.
#[derive(Debug, Clone)]
pub struct ListingUpdate {
    pub title: String,
    pub location: String,
    pub technology: String,
    pub description: String,
    pub price: i64,
}

/// Search and ordering options for the filter view.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// Case-insensitive substring matched against title, location, and
    /// technology (disjunctive).
    pub search: Option<String>,
    pub sort_by: Option<SortField>,
    pub order: SortOrder,
}

/// Whitelisted sort columns. User input never reaches the SQL text directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Location,
    Technology,
    Price,
    CreatedAt,
}

impl SortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(Self::Title),
            "location" => Some(Self::Location),
            "technology" => Some(Self::Technology),
            "price" => Some(Self::Price),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    pub(crate) fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Location => "location",
            Self::Technology => "technology",
            Self::Price => "price",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
