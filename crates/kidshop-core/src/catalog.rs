//! Catalog primitives shared by the API and the database layer.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Variants with fewer units than this are counted as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w-]").expect("valid regex"));

/// Generate a URL slug from a display name.
///
/// Lowercases, turns whitespace runs into `-`, and drops anything that is
/// not a word character or `-`.
#[must_use]
pub fn slug_from_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let dashed = WHITESPACE.replace_all(&lowered, "-");
    NON_SLUG.replace_all(&dashed, "").into_owned()
}

/// Read access to the attributes a [`VariantDescriptor`] matches against.
pub trait VariantFields {
    fn sku(&self) -> Option<&str>;
    fn design(&self) -> &str;
    fn color(&self) -> &str;
    fn size(&self) -> &str;
}

/// Identifies a variant within its product.
///
/// A non-empty `sku` wins; otherwise the variant is matched on
/// (design, color, size), with missing parts compared as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDescriptor {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub design: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

impl VariantDescriptor {
    fn sku_key(&self) -> Option<&str> {
        self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn design_or_empty(&self) -> &str {
        self.design.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn color_or_empty(&self) -> &str {
        self.color.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn size_or_empty(&self) -> &str {
        self.size.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn matches<V: VariantFields>(&self, variant: &V) -> bool {
        match self.sku_key() {
            Some(sku) => variant.sku() == Some(sku),
            None => {
                variant.design() == self.design_or_empty()
                    && variant.color() == self.color_or_empty()
                    && variant.size() == self.size_or_empty()
            }
        }
    }

    /// First variant in `variants` matching this descriptor.
    pub fn find_in<'a, V: VariantFields>(&self, variants: &'a [V]) -> Option<&'a V> {
        variants.iter().find(|v| self.matches(*v))
    }

    /// Long form used in "not found" messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.sku_key() {
            Some(sku) => format!("SKU: {sku}"),
            None => format!(
                "Design: {}, Color: {}, Size: {}",
                self.design_or_empty(),
                self.color_or_empty(),
                self.size_or_empty()
            ),
        }
    }

    /// Short form used in stock messages, e.g. `"Red M"`.
    #[must_use]
    pub fn short_label(&self) -> String {
        match self.sku_key() {
            Some(sku) => sku.to_string(),
            None => format!("{} {}", self.color_or_empty(), self.size_or_empty()),
        }
    }
}
