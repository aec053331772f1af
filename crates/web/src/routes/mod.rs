pub mod listings;
pub mod users;

use crate::error::PageError;

/// Fallback for every route the table does not know.
pub async fn not_found() -> PageError {
    PageError::not_found("Page Not Found")
}
