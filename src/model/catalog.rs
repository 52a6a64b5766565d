use rust_decimal::Decimal;
use serde::Deserialize;

/// A dish, drink or dessert as read from a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogItem {
    #[serde(alias = "Plato")]
    pub name: String,
    #[serde(alias = "Descripción")]
    pub description: String,
    #[serde(alias = "Precio", deserialize_with = "rust_decimal::serde::str::deserialize")]
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct District {
    #[serde(alias = "Distrito")]
    pub name: String,
}

/// Everything loaded at startup. Never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub menu: Vec<CatalogItem>,
    pub districts: Vec<District>,
    pub drinks: Vec<CatalogItem>,
    pub desserts: Vec<CatalogItem>,
}

/// A row of the confirmed-order table rendered into the system prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub name: String,
    pub quantity: u32,
    pub total: Decimal,
}

impl OrderLine {
    /// The all-zero placeholder row the model is asked to fill in.
    pub fn placeholder() -> Self {
        Self {
            name: String::new(),
            quantity: 0,
            total: Decimal::ZERO,
        }
    }
}
