use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::asset::{Asset, AssetKind};

#[derive(Serialize, Deserialize, Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[display("category")]
    Category,
    #[display("product")]
    Product,
}

/// Named query parameters, referenced as `$name` from the query text.
pub type QueryParams = Map<String, Value>;

/// Field assignments of a patch mutation.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct Patch {
    pub id: String,
    pub set: Map<String, Value>,
}

impl Patch {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            set: Map::new(),
        }
    }

    pub fn set<S: Into<String>>(mut self, field: S, value: Value) -> Self {
        self.set.insert(field.into(), value);
        self
    }
}

/// Hosted document store the import writes into.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Runs a query and returns its `result` (which is `null` when a `[0]`
    /// projection matched nothing).
    async fn fetch(&self, query: &str, params: QueryParams) -> Result<Value, anyhow::Error>;
    /// Creates a document and returns the id the store assigned to it.
    async fn create(&self, document: Value) -> Result<String, anyhow::Error>;
    async fn patch(&self, patch: Patch) -> Result<(), anyhow::Error>;
    async fn upload_asset(
        &self,
        kind: AssetKind,
        bytes: Vec<u8>,
        filename: Option<String>,
    ) -> Result<Asset, anyhow::Error>;
}
