//! Product domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfront_core::{Price, ProductId, UserId};

/// Longest accepted product name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Longest accepted product description.
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: Option<String>,
    /// Owner.
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: Option<String>,
}

impl NewProduct {
    /// Validate and normalize raw input.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message when a field is missing or invalid.
    pub fn new(
        name: Option<String>,
        description: Option<String>,
        price: Option<Price>,
        image: Option<String>,
    ) -> Result<Self, String> {
        let name = validate_name(name.as_deref().unwrap_or_default())?;
        let description = validate_description(description.as_deref().unwrap_or_default())?;
        let price = price.ok_or_else(|| "Price is required".to_string())?;
        Ok(Self {
            name,
            description,
            price,
            image: normalize_image(image),
        })
    }
}

/// Partial update of a product. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    /// `Some(None)` clears the image.
    pub image: Option<Option<String>>,
}

impl ProductUpdate {
    /// Validate the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message when a present field is invalid.
    pub fn new(
        name: Option<String>,
        description: Option<String>,
        price: Option<Price>,
        image: Option<Option<String>>,
    ) -> Result<Self, String> {
        Ok(Self {
            name: name.as_deref().map(validate_name).transpose()?,
            description: description
                .as_deref()
                .map(validate_description)
                .transpose()?,
            price,
            image: image.map(normalize_image),
        })
    }

    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image.is_none()
    }
}

/// Sort direction of product listings (by price).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// `asc` (case-insensitive) sorts ascending; anything else sorts descending.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Catalog listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring of the name. Blank searches are dropped.
    pub search: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Price>,
    /// Inclusive upper price bound.
    pub max_price: Option<Price>,
    pub order: SortOrder,
}

impl ProductFilter {
    /// Build a filter, trimming the search term.
    #[must_use]
    pub fn new(
        search: Option<&str>,
        min_price: Option<Price>,
        max_price: Option<Price>,
        order: SortOrder,
    ) -> Self {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        Self {
            search,
            min_price,
            max_price,
            order,
        }
    }

    /// `ILIKE` pattern for the search term, with wildcards in the term escaped.
    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|term| {
            let escaped = term
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
    }
}

fn validate_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name is required".to_string());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!("Name must be at most {MAX_NAME_LENGTH} characters"));
    }
    Ok(name.to_owned())
}

fn validate_description(description: &str) -> Result<String, String> {
    let description = description.trim();
    if description.is_empty() {
        return Err("Description is required".to_string());
    }
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(format!(
            "Description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        ));
    }
    Ok(description.to_owned())
}

fn normalize_image(image: Option<String>) -> Option<String> {
    image
        .map(|url| url.trim().to_owned())
        .filter(|url| !url.is_empty())
}
