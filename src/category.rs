use derive_more::{Display, Error};
use serde_json::{json, Value};
use std::collections::HashMap;
use vault_types::category::{Category, CategoryId, NewCategory};
use vault_types::store::{DocumentStore, QueryParams};

pub const CATEGORY_BY_NAME: &str =
    r#"*[_type == "category" && categoryName == $categoryName][0]{_id, categoryName}"#;

/// Category ids resolved during one import run, keyed by trimmed,
/// case-sensitive name.
///
/// Lives only as long as the run that owns it.
#[derive(Debug, Default)]
pub struct CategoryCache {
    entries: HashMap<String, CategoryId>,
}

impl CategoryCache {
    pub fn get(&self, name: &str) -> Option<&CategoryId> {
        self.entries.get(name)
    }

    pub fn insert(&mut self, name: String, id: CategoryId) {
        self.entries.insert(name, id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Display, Error)]
#[display("Unable to resolve category \"{name}\": {cause}")]
pub struct CategoryResolutionError {
    #[error(ignore)]
    pub name: String,
    #[error(ignore)]
    pub cause: anyhow::Error,
}

/// Maps a category name to its id, creating the category when the store
/// has none with that exact name.
///
/// A blank name means "no category" and resolves to `None` without touching
/// the store.
pub async fn resolve_category<S: DocumentStore + ?Sized>(
    store: &S,
    cache: &mut CategoryCache,
    name: &str,
) -> Result<Option<CategoryId>, CategoryResolutionError> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }
    if let Some(id) = cache.get(name) {
        log::debug!("Category \"{name}\" resolved from cache: {id}");
        return Ok(Some(id.clone()));
    }
    let err = |cause| CategoryResolutionError {
        name: name.to_string(),
        cause,
    };
    let id = match find_by_name(store, name).await.map_err(err)? {
        Some(category) => {
            log::info!("Category \"{name}\" exists with id {}", category.id);
            category.id
        }
        None => {
            log::info!("Category \"{name}\" does not exist, creating");
            let document = serde_json::to_value(NewCategory::new(name))
                .map_err(|e| err(e.into()))?;
            store.create(document).await.map_err(err)?
        }
    };
    cache.insert(name.to_string(), id.clone());
    Ok(Some(id))
}

async fn find_by_name<S: DocumentStore + ?Sized>(
    store: &S,
    name: &str,
) -> Result<Option<Category>, anyhow::Error> {
    let mut params = QueryParams::new();
    params.insert("categoryName".to_string(), json!(name));
    match store.fetch(CATEGORY_BY_NAME, params).await? {
        Value::Null => Ok(None),
        found => Ok(Some(serde_json::from_value(found)?)),
    }
}
