use derive_more::Display;
use serde::{Deserialize, Serialize};
use typesafe_repository::macros::Id;
use typesafe_repository::prelude::*;
use typesafe_repository::IdentityOf;

#[derive(Id, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    #[id]
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "originalFilename", default)]
    pub original_filename: Option<String>,
}

pub type AssetId = IdentityOf<Asset>;

#[derive(Serialize, Deserialize, Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    #[display("image")]
    Image,
    #[display("file")]
    File,
}

impl AssetKind {
    /// Path segment of the assets endpoint for this kind.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::File => "files",
        }
    }
}
