//! Form schemas and the validation gate applied before any write.
//!
//! Each inbound form implements [`FormSchema`]; handlers run the gate
//! before touching the database, so a rejected form never produces a
//! partial write. All fields deserialize leniently (missing fields become
//! empty strings) and presence is enforced here, keeping every validation
//! failure on the same 400 path.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use nestboard_db::{ListingFilter, NewListing, SortField, SortOrder};

const TITLE_MAX: usize = 120;
const LOCATION_MAX: usize = 120;
const TECHNOLOGY_MAX: usize = 60;
const DESCRIPTION_MAX: usize = 2000;
const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 30;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 128;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("username pattern"));

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct SchemaError(pub String);

impl SchemaError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Validation seam for inbound forms. Handlers call `validate` before
/// acting on the payload; swapping the rules only touches the form type.
pub trait FormSchema {
    fn validate(&self) -> Result<(), SchemaError>;
}

fn require(value: &str, field: &str, max: usize) -> Result<(), SchemaError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SchemaError::new(format!("{field} is required")));
    }
    if trimmed.chars().count() > max {
        return Err(SchemaError::new(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ListingForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub technology: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Option<String>,
}

impl ListingForm {
    fn parsed_price(&self) -> Result<i64, SchemaError> {
        let raw = match &self.price {
            Some(raw) if !raw.trim().is_empty() => raw.trim(),
            _ => return Ok(0),
        };
        let price: i64 = raw
            .parse()
            .map_err(|_| SchemaError::new("price must be a whole number"))?;
        if price < 0 {
            return Err(SchemaError::new("price must not be negative"));
        }
        Ok(price)
    }

    /// Runs the schema gate and converts into a persistable record.
    pub fn into_listing(self) -> Result<NewListing, SchemaError> {
        self.validate()?;
        let price = self.parsed_price()?;
        Ok(NewListing {
            title: self.title.trim().to_owned(),
            location: self.location.trim().to_owned(),
            technology: self.technology.trim().to_owned(),
            description: self.description.trim().to_owned(),
            price,
        })
    }
}

impl FormSchema for ListingForm {
    fn validate(&self) -> Result<(), SchemaError> {
        require(&self.title, "title", TITLE_MAX)?;
        require(&self.location, "location", LOCATION_MAX)?;
        require(&self.technology, "technology", TECHNOLOGY_MAX)?;
        if self.description.trim().chars().count() > DESCRIPTION_MAX {
            return Err(SchemaError::new(format!(
                "description must be at most {DESCRIPTION_MAX} characters"
            )));
        }
        self.parsed_price()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl FormSchema for SignupForm {
    fn validate(&self) -> Result<(), SchemaError> {
        let username = self.username.trim();
        if username.chars().count() < USERNAME_MIN || username.chars().count() > USERNAME_MAX {
            return Err(SchemaError::new(format!(
                "username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
            )));
        }
        if !USERNAME_RE.is_match(username) {
            return Err(SchemaError::new(
                "username may only contain letters, numbers, hyphens and underscores",
            ));
        }
        if self.password.chars().count() < PASSWORD_MIN {
            return Err(SchemaError::new(format!(
                "password must be at least {PASSWORD_MIN} characters"
            )));
        }
        if self.password.chars().count() > PASSWORD_MAX {
            return Err(SchemaError::new(format!(
                "password must be at most {PASSWORD_MAX} characters"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl FormSchema for LoginForm {
    fn validate(&self) -> Result<(), SchemaError> {
        if self.username.trim().is_empty() {
            return Err(SchemaError::new("username is required"));
        }
        if self.password.is_empty() {
            return Err(SchemaError::new("password is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
}

impl FilterForm {
    /// Unknown sort fields and orders fall back to defaults rather than
    /// erroring, so hand-edited filter forms still render a page.
    pub fn into_filter(self) -> ListingFilter {
        ListingFilter {
            search: self
                .search
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty()),
            sort_by: self.sort_by.as_deref().and_then(SortField::parse),
            order: self
                .order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
        }
    }
}
