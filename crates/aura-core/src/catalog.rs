//! Product catalog.
//!
//! Products carry the attribute labels they suit. The built-in catalog is
//! embedded at compile time from `contrib/catalog.toml`; deployments can
//! point at their own TOML or JSON file instead.

use crate::error::CatalogError;
use crate::types::{AttributeKind, Gender};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

const BUILTIN_CATALOG: &str = include_str!("../../../contrib/catalog.toml");

static BUILTIN: OnceLock<StaticCatalog> = OnceLock::new();

/// One catalog entry. An empty label list is neutral: it adds nothing to the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub body_types: Vec<String>,
    #[serde(default)]
    pub face_shapes: Vec<String>,
    #[serde(default)]
    pub skin_tones: Vec<String>,
}

impl Product {
    /// Labels this product targets for `kind`.
    pub fn labels_for(&self, kind: AttributeKind) -> &[String] {
        match kind {
            AttributeKind::Body => &self.body_types,
            AttributeKind::Face => &self.face_shapes,
            AttributeKind::Skin => &self.skin_tones,
        }
    }

    /// Unisex products (no gender) match every gender.
    pub fn fits_gender(&self, gender: Gender) -> bool {
        self.gender.map_or(true, |g| g == gender)
    }
}

/// Read-only product lookup consumed by the recommender.
pub trait Catalog: Send + Sync {
    fn products(&self) -> &[Product];

    /// First `limit` products, optionally restricted to one gender.
    fn list(&self, gender: Option<Gender>, limit: usize) -> Vec<&Product> {
        self.products()
            .iter()
            .filter(|p| gender.map_or(true, |g| p.fits_gender(g)))
            .take(limit)
            .collect()
    }
}

impl<T: Catalog + ?Sized> Catalog for &T {
    fn products(&self) -> &[Product] {
        (**self).products()
    }
}

impl<T: Catalog + ?Sized> Catalog for std::sync::Arc<T> {
    fn products(&self) -> &[Product] {
        (**self).products()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "product")]
    products: Vec<Product>,
}

/// Catalog held in memory, loaded once.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for p in &products {
            if !seen.insert(p.id.as_str()) {
                return Err(CatalogError::DuplicateId(p.id.clone()));
            }
        }
        for p in &products {
            warn_unknown_labels(p);
        }
        Ok(Self { products })
    }

    /// Parse a TOML catalog (`[[product]]` tables).
    pub fn from_toml(src: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(src)?;
        Self::new(file.products)
    }

    /// Parse a JSON catalog: either `{"product": [...]}` or a bare array.
    pub fn from_json(src: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value = serde_json::from_str(src)?;
        let products: Vec<Product> = if value.is_array() {
            serde_json::from_value(value)?
        } else {
            serde_json::from_value::<CatalogFile>(value)?.products
        };
        Self::new(products)
    }

    /// Load from a file; `.json` is parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let src = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&src)?,
            _ => Self::from_toml(&src)?,
        };
        tracing::info!(path = %path.display(), products = catalog.products.len(), "catalog loaded");
        Ok(catalog)
    }

    /// The compiled-in catalog. An unparsable embedded file yields an empty catalog.
    pub fn builtin() -> &'static StaticCatalog {
        BUILTIN.get_or_init(|| match Self::from_toml(BUILTIN_CATALOG) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "built-in catalog is invalid");
                StaticCatalog::default()
            }
        })
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Catalog for StaticCatalog {
    fn products(&self) -> &[Product] {
        &self.products
    }
}

fn warn_unknown_labels(product: &Product) {
    for kind in AttributeKind::ALL {
        for label in product.labels_for(kind) {
            if !kind.is_label(label) {
                tracing::warn!(product = %product.id, %kind, label = %label, "catalog label not in vocabulary; it will never match");
            }
        }
    }
}
