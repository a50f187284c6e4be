use serde::{Deserialize, Serialize};
use typesafe_repository::macros::Id;
use typesafe_repository::prelude::*;

use crate::store::DocumentType;
use crate::{ImageField, Reference};

#[derive(Id, Deserialize, Clone, Debug, PartialEq)]
pub struct Product {
    #[id]
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "productName", default)]
    pub product_name: Option<String>,
}

/// Product document as it is written by the bulk import.
///
/// Absent optional values are left out of the document instead of being
/// written as `null`. A `NaN` price or inventory is written as `null`.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NewProduct {
    #[serde(rename = "_type")]
    pub kind: DocumentType,
    #[serde(rename = "productName", skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<f64>,
    pub colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageField>,
}

impl Default for NewProduct {
    fn default() -> Self {
        Self {
            kind: DocumentType::Product,
            product_name: None,
            category: None,
            price: None,
            inventory: None,
            colors: vec![],
            status: None,
            description: None,
            image: None,
        }
    }
}
