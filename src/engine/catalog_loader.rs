use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::info;

use crate::model::catalog::{Catalog, CatalogItem, District};

pub const MENU_FILE: &str = "carta.csv";
pub const DISTRICTS_FILE: &str = "distritos.csv";
pub const DRINKS_FILE: &str = "Bebidas.csv";
pub const DESSERTS_FILE: &str = "Postres.csv";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("bad row in {}: {source}", .path.display())]
    Row {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Load the four catalog files from `dir`. Any failure aborts the whole load.
pub fn load_catalog(dir: &Path) -> Result<Catalog, CatalogError> {
    let catalog = Catalog {
        menu: load_items(&dir.join(MENU_FILE))?,
        districts: load_districts(&dir.join(DISTRICTS_FILE))?,
        drinks: load_items(&dir.join(DRINKS_FILE))?,
        desserts: load_items(&dir.join(DESSERTS_FILE))?,
    };

    info!(
        dir = %dir.display(),
        dishes = catalog.menu.len(),
        districts = catalog.districts.len(),
        drinks = catalog.drinks.len(),
        desserts = catalog.desserts.len(),
        "catalog loaded"
    );

    Ok(catalog)
}

/// Rows of a `name,description,price` file, in file order.
pub fn load_items(path: &Path) -> Result<Vec<CatalogItem>, CatalogError> {
    load_rows(path)
}

/// Rows of a `name` file, in file order.
pub fn load_districts(path: &Path) -> Result<Vec<District>, CatalogError> {
    load_rows(path)
}

fn load_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| CatalogError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| CatalogError::Row {
            path: path.to_path_buf(),
            source,
        })
}
