use serde::{Deserialize, Serialize};

pub mod asset;
pub mod category;
pub mod import;
pub mod product;
pub mod store;

/// Strong reference to another document, as the store expects it inside a
/// document body.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    #[serde(rename = "_type")]
    pub kind: ReferenceKind,
    #[serde(rename = "_ref")]
    pub to: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Reference,
}

impl Reference {
    pub fn to<S: Into<String>>(id: S) -> Self {
        Self {
            kind: ReferenceKind::Reference,
            to: id.into(),
        }
    }
}

/// Image field of a document: a typed wrapper around a reference to an
/// uploaded image asset.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ImageField {
    #[serde(rename = "_type")]
    pub kind: ImageKind,
    pub asset: Reference,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Image,
}

impl ImageField {
    pub fn from_asset<S: Into<String>>(asset_id: S) -> Self {
        Self {
            kind: ImageKind::Image,
            asset: Reference::to(asset_id),
        }
    }
}
