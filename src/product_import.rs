use derive_more::{Display, Error};
use std::time::Instant;
use vault_types::import::{ImportLogEntry, ImportRow};
use vault_types::store::DocumentStore;

use crate::category::{resolve_category, CategoryCache, CategoryResolutionError};
use crate::image::{resolve_image, ImageFetcher, ImageResolution};
use crate::normalize::normalize;
use crate::parser::{parse_rows, FileKind, ParseError};
use crate::product::{build_document, find_existing};
use crate::{format_duration, DEFAULT_PLACEHOLDER_IMAGE_URL};

pub const PLACEHOLDER_USED: &str = "Placeholder image used";
pub const IMAGE_UNAVAILABLE: &str = "Image unavailable, continuing without image";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportOptions {
    pub placeholder_image_url: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            placeholder_image_url: DEFAULT_PLACEHOLDER_IMAGE_URL.to_string(),
        }
    }
}

impl ImportOptions {
    pub fn from_env() -> Self {
        Self {
            placeholder_image_url: envmnt::get_or(
                "PLACEHOLDER_IMAGE_URL",
                DEFAULT_PLACEHOLDER_IMAGE_URL,
            ),
        }
    }
}

/// Reason a single row did not produce a product. Never aborts the run.
#[derive(Debug, Display, Error)]
pub enum RowError {
    #[display("{_0}")]
    Category(CategoryResolutionError),
    #[display("{name} already exists")]
    Duplicate { name: String },
    #[display("Error uploading {name}: {cause:#}")]
    Persistence {
        name: String,
        #[error(ignore)]
        cause: anyhow::Error,
    },
}

impl RowError {
    /// Message shown to the user for the failed row.
    pub fn message(&self) -> String {
        match self {
            Self::Category(err) => format!("Unable to resolve category \"{}\"", err.name),
            Self::Duplicate { name } => format!("{name} already exists"),
            Self::Persistence { name, .. } => format!("Error uploading {name}"),
        }
    }
}

/// Parses an uploaded file and imports every row it contains.
///
/// Only a parse failure is returned; per-row outcomes go to `report` as soon
/// as each row completes.
pub async fn import_products<S, F, R>(
    store: &S,
    fetcher: &F,
    options: &ImportOptions,
    bytes: &[u8],
    kind: FileKind,
    report: R,
) -> Result<(), ParseError>
where
    S: DocumentStore + ?Sized,
    F: ImageFetcher + ?Sized,
    R: FnMut(ImportLogEntry),
{
    let rows = parse_rows(bytes, kind)?;
    import_rows(store, fetcher, options, rows, report).await;
    Ok(())
}

/// Imports rows strictly one after another, in input order.
pub async fn import_rows<S, F, R>(
    store: &S,
    fetcher: &F,
    options: &ImportOptions,
    rows: Vec<ImportRow>,
    mut report: R,
) where
    S: DocumentStore + ?Sized,
    F: ImageFetcher + ?Sized,
    R: FnMut(ImportLogEntry),
{
    let started = Instant::now();
    let total = rows.len();
    log::info!("Migrating {total} products");
    let mut cache = CategoryCache::default();
    for (idx, row) in rows.into_iter().enumerate() {
        let entry = match import_row(store, fetcher, options, &mut cache, &row, &mut report).await
        {
            Ok(name) => {
                log::info!("[{}/{total}] Uploaded {name}", idx + 1);
                ImportLogEntry::succeeded(row, format!("Uploaded {name} successfully"))
            }
            Err(err) => {
                log::warn!("[{}/{total}] {err}", idx + 1);
                let message = err.message();
                ImportLogEntry::failed(row, message)
            }
        };
        report(entry);
    }
    log::info!(
        "Import of {total} rows finished in {}, {} categories resolved",
        format_duration(&started.elapsed()),
        cache.len()
    );
}

async fn import_row<S, F, R>(
    store: &S,
    fetcher: &F,
    options: &ImportOptions,
    cache: &mut CategoryCache,
    row: &ImportRow,
    report: &mut R,
) -> Result<String, RowError>
where
    S: DocumentStore + ?Sized,
    F: ImageFetcher + ?Sized,
    R: FnMut(ImportLogEntry),
{
    let normalized = normalize(row);
    let name = normalized.display_name().to_string();

    let image = match normalized.image.as_deref() {
        Some(url) => {
            let resolution =
                resolve_image(store, fetcher, url, &options.placeholder_image_url).await;
            match &resolution {
                ImageResolution::Uploaded(_) => (),
                ImageResolution::Placeholder(_) => {
                    report(ImportLogEntry::warning(row.clone(), PLACEHOLDER_USED))
                }
                ImageResolution::Unavailable => {
                    report(ImportLogEntry::warning(row.clone(), IMAGE_UNAVAILABLE))
                }
            }
            resolution.asset_id().cloned()
        }
        None => None,
    };

    let category = match normalized.category.as_deref() {
        Some(category) => resolve_category(store, cache, category)
            .await
            .map_err(RowError::Category)?,
        None => None,
    };

    let persistence = |cause| RowError::Persistence {
        name: name.clone(),
        cause,
    };
    if let Some(product_name) = normalized.product_name.as_deref() {
        if find_existing(store, product_name)
            .await
            .map_err(persistence)?
            .is_some()
        {
            return Err(RowError::Duplicate { name: name.clone() });
        }
    }

    let document = serde_json::to_value(build_document(normalized, category, image))
        .map_err(|err| persistence(err.into()))?;
    let id = store.create(document).await.map_err(persistence)?;
    log::debug!("Product {name} created with id {id}");
    Ok(name)
}
