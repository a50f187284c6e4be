use serde::{Deserialize, Serialize};
use typesafe_repository::macros::Id;
use typesafe_repository::prelude::*;
use typesafe_repository::IdentityOf;

use crate::store::DocumentType;

#[derive(Id, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Category {
    #[id]
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "categoryName", default)]
    pub category_name: Option<String>,
}

/// Body of a category document that does not exist yet.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct NewCategory {
    #[serde(rename = "_type")]
    pub kind: DocumentType,
    #[serde(rename = "categoryName")]
    pub category_name: String,
}

impl NewCategory {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            kind: DocumentType::Category,
            category_name: name.into(),
        }
    }
}

pub type CategoryId = IdentityOf<Category>;
