use anyhow::Context;
use async_trait::async_trait;
use derive_more::{Display, Error};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vault_types::asset::{Asset, AssetKind};
use vault_types::store::{DocumentStore, Patch, QueryParams};

pub const DEFAULT_API_HOST: &str = "api.sanity.io";
pub const DEFAULT_API_VERSION: &str = "2024-01-01";
pub const DEFAULT_DATASET: &str = "production";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub api_host: String,
    pub token: Option<String>,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let project_id: String =
            envmnt::get_parse("STORE_PROJECT_ID").context("STORE_PROJECT_ID not set")?;
        Ok(Self {
            project_id,
            dataset: envmnt::get_or("STORE_DATASET", DEFAULT_DATASET),
            api_version: envmnt::get_or("STORE_API_VERSION", DEFAULT_API_VERSION),
            api_host: envmnt::get_or("STORE_API_HOST", DEFAULT_API_HOST),
            token: Some(envmnt::get_or("STORE_TOKEN", "")).filter(|t| !t.is_empty()),
        })
    }

    /// Versioned API root. A host given with a scheme is used as is, which
    /// allows pointing the client at a local store.
    pub fn base_url(&self) -> String {
        let version = self.api_version.trim_start_matches('v');
        if self.api_host.starts_with("http://") || self.api_host.starts_with("https://") {
            format!("{}/v{version}", self.api_host.trim_end_matches('/'))
        } else {
            format!("https://{}.{}/v{version}", self.project_id, self.api_host)
        }
    }
}

#[derive(Debug, Display, Error)]
pub enum StoreError {
    #[display("Request to document store failed: {_0}")]
    Transport(reqwest::Error),
    #[display("Document store answered {status}: {body}")]
    Status { status: u16, body: String },
    #[display("Unable to decode document store response: {_0}")]
    Decode(serde_json::Error),
    #[error(ignore)]
    #[display("Document store returned no result for {_0}")]
    MissingResult(String),
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Mutation {
    Create(Value),
    Patch(Patch),
}

#[derive(Serialize)]
struct MutationRequest {
    mutations: Vec<Mutation>,
}

#[derive(Deserialize, Debug)]
pub struct MutationResponse {
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    #[serde(default)]
    pub results: Vec<MutationResult>,
}

#[derive(Deserialize, Debug)]
pub struct MutationResult {
    pub id: String,
    pub operation: Option<String>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Deserialize)]
struct AssetResponse {
    document: Asset,
}

/// Client for the hosted document store's HTTP API.
#[derive(Clone)]
pub struct HttpStore {
    client: Client,
    config: StoreConfig,
}

impl HttpStore {
    pub fn new(client: Client, config: StoreConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, StoreError> {
        let response = self
            .authorize(req)
            .send()
            .await
            .map_err(StoreError::Transport)?;
        let status = response.status();
        let body = response.text().await.map_err(StoreError::Transport)?;
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(StoreError::Decode)
    }

    pub async fn query(&self, query: &str, params: &QueryParams) -> Result<Value, StoreError> {
        let url = format!("{}/data/query/{}", self.config.base_url(), self.config.dataset);
        let req = self.client.get(url).query(&query_pairs(query, params));
        let res: QueryResponse = self.send(req).await?;
        Ok(res.result)
    }

    pub async fn mutate(&self, mutations: Vec<Mutation>) -> Result<MutationResponse, StoreError> {
        let url = format!(
            "{}/data/mutate/{}",
            self.config.base_url(),
            self.config.dataset
        );
        let req = self
            .client
            .post(url)
            .query(&[("returnIds", "true")])
            .json(&MutationRequest { mutations });
        self.send(req).await
    }

    /// Starts a patch of document `id`; nothing is sent until `commit`.
    pub fn patch<S: Into<String>>(&self, id: S) -> PatchBuilder<'_> {
        PatchBuilder {
            store: self,
            patch: Patch::new(id),
        }
    }

    pub async fn upload(
        &self,
        kind: AssetKind,
        bytes: Vec<u8>,
        filename: Option<String>,
    ) -> Result<Asset, StoreError> {
        let url = format!(
            "{}/assets/{}/{}",
            self.config.base_url(),
            kind.endpoint(),
            self.config.dataset
        );
        let mut req = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes);
        if let Some(filename) = &filename {
            req = req.query(&[("filename", filename)]);
        }
        let res: AssetResponse = self.send(req).await?;
        Ok(res.document)
    }
}

pub struct PatchBuilder<'a> {
    store: &'a HttpStore,
    patch: Patch,
}

impl PatchBuilder<'_> {
    pub fn set(mut self, fields: Map<String, Value>) -> Self {
        self.patch.set.extend(fields);
        self
    }

    pub async fn commit(self) -> Result<MutationResponse, StoreError> {
        self.store.mutate(vec![Mutation::Patch(self.patch)]).await
    }
}

/// Query string of a query request: the query text plus one `$name`
/// parameter per bound value, JSON encoded.
pub fn query_pairs(query: &str, params: &QueryParams) -> Vec<(String, String)> {
    std::iter::once(("query".to_string(), query.to_string()))
        .chain(
            params
                .iter()
                .map(|(name, value)| (format!("${name}"), value.to_string())),
        )
        .collect()
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn fetch(&self, query: &str, params: QueryParams) -> Result<Value, anyhow::Error> {
        Ok(self.query(query, &params).await?)
    }

    async fn create(&self, document: Value) -> Result<String, anyhow::Error> {
        let res = self.mutate(vec![Mutation::Create(document)]).await?;
        let id = res
            .results
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| StoreError::MissingResult(format!("create in {}", res.transaction_id)))?;
        Ok(id)
    }

    async fn patch(&self, patch: Patch) -> Result<(), anyhow::Error> {
        self.mutate(vec![Mutation::Patch(patch)]).await?;
        Ok(())
    }

    async fn upload_asset(
        &self,
        kind: AssetKind,
        bytes: Vec<u8>,
        filename: Option<String>,
    ) -> Result<Asset, anyhow::Error> {
        Ok(self.upload(kind, bytes, filename).await?)
    }
}
