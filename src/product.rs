use serde_json::{json, Value};
use vault_types::asset::AssetId;
use vault_types::category::CategoryId;
use vault_types::product::{NewProduct, Product};
use vault_types::store::{DocumentStore, QueryParams};
use vault_types::{ImageField, Reference};

use crate::normalize::NormalizedRow;

pub const PRODUCT_BY_NAME: &str =
    r#"*[_type == "product" && productName == $productName][0]{_id, productName}"#;

/// Looks up a product by exact name. No case or whitespace folding is
/// applied, so "Air Runner" and "Air Runner " are different products.
pub async fn find_existing<S: DocumentStore + ?Sized>(
    store: &S,
    product_name: &str,
) -> Result<Option<Product>, anyhow::Error> {
    let mut params = QueryParams::new();
    params.insert("productName".to_string(), json!(product_name));
    match store.fetch(PRODUCT_BY_NAME, params).await? {
        Value::Null => Ok(None),
        found => Ok(Some(serde_json::from_value(found)?)),
    }
}

pub fn build_document(
    row: NormalizedRow,
    category: Option<CategoryId>,
    image: Option<AssetId>,
) -> NewProduct {
    NewProduct {
        product_name: row.product_name,
        category: category.map(Reference::to),
        price: row.price,
        inventory: row.inventory,
        colors: row.colors,
        status: row.status,
        description: row.description,
        image: image.map(ImageField::from_asset),
        ..Default::default()
    }
}
