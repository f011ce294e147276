//! Seed the catalog with products from a YAML file.
//!
//! ```yaml
//! owner: seller@example.com
//! products:
//!   - name: Teapot
//!     description: Stoneware, 1.2 litres
//!     price: "34.50"
//!     image: https://res.cloudinary.com/demo/image/upload/v1/shopfront/teapot.jpg
//! ```
//!
//! The file is parsed and validated before connecting to the database.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use shopfront_core::{Email, Price};
use shopfront_storefront::db::{ProductRepository, UserRepository};
use shopfront_storefront::models::NewProduct;

use super::{CliError, connect};

/// Top-level shape of a seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    /// Default owner email, overridden by `--owner`.
    #[serde(default)]
    pub owner: Option<String>,
    pub products: Vec<SeedProduct>,
}

/// One product entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Validate every entry, returning the products or one message per bad entry.
fn validate(file: SeedFile) -> Result<Vec<NewProduct>, Vec<String>> {
    let mut products = Vec::with_capacity(file.products.len());
    let mut errors = Vec::new();

    for (index, entry) in file.products.into_iter().enumerate() {
        let label = entry
            .name
            .clone()
            .unwrap_or_else(|| format!("#{}", index + 1));
        match NewProduct::new(entry.name, entry.description, entry.price, entry.image) {
            Ok(product) => products.push(product),
            Err(message) => errors.push(format!("{label}: {message}")),
        }
    }

    if errors.is_empty() {
        Ok(products)
    } else {
        Err(errors)
    }
}

/// Insert the products listed in `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or validated, the owner does
/// not exist, or an insert fails.
pub async fn products(file_path: &str, owner: Option<&str>) -> Result<(), CliError> {
    info!(path = %file_path, "Loading products from file");

    let content = tokio::fs::read_to_string(Path::new(file_path))
        .await
        .map_err(|source| CliError::Io {
            path: file_path.to_owned(),
            source,
        })?;
    let file: SeedFile = serde_yaml::from_str(&content)?;

    let owner = owner
        .map(str::to_owned)
        .or_else(|| file.owner.clone())
        .ok_or(CliError::MissingOwner)?;
    let owner = Email::parse(&owner).map_err(|_| CliError::InvalidEmail(owner.clone()))?;

    let products = validate(file).map_err(|errors| {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        CliError::Validation(errors.len())
    })?;
    info!(products = products.len(), "Seed file validated successfully");

    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .get_by_email(&owner)
        .await?
        .ok_or_else(|| CliError::UserNotFound(owner.to_string()))?;

    let repo = ProductRepository::new(&pool);
    for product in &products {
        let created = repo.create(user.id, product).await?;
        info!("  {} ({}) at {}", created.name, created.id, created.price);
    }

    info!("Seeding complete! {} products owned by {}", products.len(), owner);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SEED: &str = r#"
owner: seller@example.com
products:
  - name: Teapot
    description: Stoneware, 1.2 litres
    price: "34.50"
  - name: Mug
    description: Pair of mugs
    price: "12"
    image: https://res.cloudinary.com/demo/image/upload/v1/shopfront/mug.jpg
"#;

    #[test]
    fn test_parse_and_validate() {
        let file: SeedFile = serde_yaml::from_str(SEED).unwrap();
        assert_eq!(file.owner.as_deref(), Some("seller@example.com"));

        let products = validate(file).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price, Price::parse("34.50").unwrap());
        assert_eq!(products[0].image, None);
        assert!(products[1].image.is_some());
    }

    #[test]
    fn test_validation_collects_every_error() {
        let file: SeedFile = serde_yaml::from_str(
            r#"
products:
  - description: nameless
    price: "1"
  - name: Free lunch
    description: ok
"#,
        )
        .unwrap();

        let errors = validate(file).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("#1: "));
        assert!(errors[1].starts_with("Free lunch: "));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(serde_yaml::from_str::<SeedFile>("products: []\nvendor: x\n").is_err());
    }
}
