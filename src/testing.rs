use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use vault_types::asset::{Asset, AssetKind};
use vault_types::store::{DocumentStore, Patch, QueryParams};

use crate::image::ImageFetcher;

/// Store double keeping documents in memory and recording every call.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
pub struct State {
    pub categories: Vec<(String, String)>,
    pub products: Vec<Value>,
    pub creates: Vec<Value>,
    pub patches: Vec<Patch>,
    pub uploads: Vec<Option<String>>,
    pub fetches: usize,
    pub failing_category_creates: HashSet<String>,
    pub failing_product_creates: HashSet<String>,
    pub failing_lookups: bool,
    pub failing_uploads: bool,
    next_id: usize,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

impl MemoryStore {
    pub fn with_category(self, name: &str) -> Self {
        self.update(|s| {
            let id = s.next_id("category");
            s.categories.push((id, name.to_string()));
        })
    }

    pub fn with_product(self, name: &str) -> Self {
        self.update(|s| {
            let id = s.next_id("product");
            s.products.push(json!({ "_id": id, "productName": name }));
        })
    }

    pub fn failing_category_create(self, name: &str) -> Self {
        self.update(|s| {
            s.failing_category_creates.insert(name.to_string());
        })
    }

    pub fn failing_product_create(self, name: &str) -> Self {
        self.update(|s| {
            s.failing_product_creates.insert(name.to_string());
        })
    }

    pub fn failing_lookups(self) -> Self {
        self.update(|s| s.failing_lookups = true)
    }

    pub fn failing_uploads(self) -> Self {
        self.update(|s| s.failing_uploads = true)
    }

    fn update(self, f: impl FnOnce(&mut State)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn read<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        f(&self.state.lock().unwrap())
    }

    pub fn created_of(&self, kind: &str) -> Vec<Value> {
        self.read(|s| {
            s.creates
                .iter()
                .filter(|d| d["_type"] == kind)
                .cloned()
                .collect()
        })
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch(&self, _query: &str, params: QueryParams) -> Result<Value, anyhow::Error> {
        let mut s = self.state.lock().unwrap();
        s.fetches += 1;
        if s.failing_lookups {
            return Err(anyhow!("store unavailable"));
        }
        if let Some(name) = params.get("categoryName") {
            return Ok(s
                .categories
                .iter()
                .find(|(_, n)| name == n)
                .map(|(id, n)| json!({ "_id": id, "categoryName": n }))
                .unwrap_or(Value::Null));
        }
        if let Some(name) = params.get("productName") {
            return Ok(s
                .products
                .iter()
                .find(|p| &p["productName"] == name)
                .cloned()
                .unwrap_or(Value::Null));
        }
        Err(anyhow!("unexpected query parameters {params:?}"))
    }

    async fn create(&self, document: Value) -> Result<String, anyhow::Error> {
        let mut s = self.state.lock().unwrap();
        s.creates.push(document.clone());
        match document["_type"].as_str() {
            Some("category") => {
                let name = document["categoryName"].as_str().unwrap_or_default().to_string();
                if s.failing_category_creates.contains(&name) {
                    return Err(anyhow!("category create rejected"));
                }
                let id = s.next_id("category");
                s.categories.push((id.clone(), name));
                Ok(id)
            }
            Some("product") => {
                let name = document["productName"].as_str().unwrap_or_default();
                if s.failing_product_creates.contains(name) {
                    return Err(anyhow!("product create rejected"));
                }
                let id = s.next_id("product");
                let mut stored = document.clone();
                stored["_id"] = json!(id);
                s.products.push(stored);
                Ok(id)
            }
            other => Err(anyhow!("unexpected document type {other:?}")),
        }
    }

    async fn patch(&self, patch: Patch) -> Result<(), anyhow::Error> {
        self.state.lock().unwrap().patches.push(patch);
        Ok(())
    }

    async fn upload_asset(
        &self,
        _kind: AssetKind,
        _bytes: Vec<u8>,
        filename: Option<String>,
    ) -> Result<Asset, anyhow::Error> {
        let mut s = self.state.lock().unwrap();
        s.uploads.push(filename.clone());
        if s.failing_uploads {
            return Err(anyhow!("asset upload rejected"));
        }
        Ok(Asset {
            id: s.next_id("image"),
            url: None,
            original_filename: filename,
        })
    }
}

/// Image source answering only for the URLs it was given.
#[derive(Default)]
pub struct ScriptedFetcher {
    images: HashMap<String, Vec<u8>>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn serving(mut self, url: &str) -> Self {
        self.images.insert(url.to_string(), vec![0xff, 0xd8, 0xff]);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, anyhow::Error> {
        self.requested.lock().unwrap().push(url.to_string());
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("{url} is unreachable"))
    }
}
