//! Read-only product catalog.
//!
//! The catalog backs the browsing pages. It is loaded once, either from a
//! JSON file named by `TINDAHAN_CATALOG_PATH` or from the built-in product
//! list, and never mutated afterwards.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;
use tracing::instrument;

use tindahan_core::ProductId;

use crate::models::Product;

const DEFAULT_CATALOG: &str = include_str!("default_catalog.json");

/// Errors that can occur while loading or querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The catalog JSON is malformed.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two products share an id.
    #[error("duplicate product id in catalog: {0}")]
    DuplicateId(ProductId),

    /// No product with this id.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The chosen color or size is not offered for the product.
    #[error("{option} {value:?} is not available for product {product}")]
    InvalidVariant {
        product: ProductId,
        option: &'static str,
        value: String,
    },
}

/// An immutable list of products.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from products, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` on the first repeated id.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(&product.id) {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }
        Ok(Self { products })
    }

    /// The products bundled with the binary.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the bundled JSON is invalid.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_CATALOG)
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` or `CatalogError::DuplicateId`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// Load a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Read` if the file cannot be read, otherwise as
    /// [`Catalog::from_json`].
    #[instrument(skip_all)]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            count = catalog.products.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == *id)
    }

    /// Look up a product, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound`.
    pub fn require(&self, id: &ProductId) -> Result<&Product, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// Products in a category, compared case-insensitively.
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Product> {
        self.products
            .iter()
            .filter(move |p| p.category.eq_ignore_ascii_case(category))
    }

    /// Distinct category names, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self.products.iter().map(|p| p.category.as_str()).collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    /// Case-insensitive substring search over name and description.
    ///
    /// A blank query matches nothing.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&query)
                    || p.description.to_lowercase().contains(&query)
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
