use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use actix_web::post;
use actix_web::web::{Bytes, Data};
use actix_web::HttpResponse;
use anyhow::Context;
use log_error::LogError;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use vault_types::import::{ImportLogEntry, ImportRow, ImportSummary};
use vault_types::store::DocumentStore;

use super::{ControllerError, Response};
use crate::image::ImageFetcher;
use crate::parser::{parse_rows, FileKind};
use crate::product_import::{import_rows, ImportOptions};

pub const NO_FILE: &str = "No file uploaded";
pub const UNSUPPORTED_FORMAT: &str = "Unsupported file format";

#[derive(MultipartForm, Debug)]
pub struct BulkUploadForm {
    file: Option<TempFile>,
}

async fn read_upload(form: BulkUploadForm) -> Result<(Vec<u8>, FileKind), ControllerError> {
    let file = form
        .file
        .filter(|f| f.size > 0 || f.file_name.as_deref().is_some_and(|n| !n.is_empty()))
        .ok_or_else(|| ControllerError::invalid_input(NO_FILE))?;
    let kind = file
        .file_name
        .as_deref()
        .and_then(|name| FileKind::from_file_name(name).ok())
        .ok_or_else(|| ControllerError::invalid_input(UNSUPPORTED_FORMAT))?;
    let bytes = tokio::fs::read(file.file.path())
        .await
        .context("Unable to read uploaded file")?;
    Ok((bytes, kind))
}

fn ndjson_line(entry: &ImportLogEntry) -> Result<Bytes, serde_json::Error> {
    let mut line = serde_json::to_vec(entry)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}

/// Imports every row of the uploaded file, answering with one JSON log entry
/// per line as rows complete.
#[post("/api/products/bulk")]
pub async fn bulk_upload(
    form: MultipartForm<BulkUploadForm>,
    store: Data<Arc<dyn DocumentStore>>,
    fetcher: Data<Arc<dyn ImageFetcher>>,
    options: Data<ImportOptions>,
) -> Response {
    let (bytes, kind) = read_upload(form.into_inner()).await?;
    let rows = parse_rows(&bytes, kind)?;
    log::info!("Bulk upload of {} rows from {kind} file", rows.len());

    let (tx, rx) = mpsc::unbounded_channel::<ImportLogEntry>();
    let store = store.get_ref().clone();
    let fetcher = fetcher.get_ref().clone();
    actix_web::rt::spawn(async move {
        let mut summary = ImportSummary::default();
        import_rows(store.as_ref(), fetcher.as_ref(), &options, rows, |entry| {
            summary.record(&entry);
            tx.send(entry).log_error("Import log receiver is gone");
        })
        .await;
        if summary.has_failures() {
            log::warn!(
                "Bulk upload finished: {} of {} rows failed",
                summary.failed,
                summary.rows()
            );
        } else {
            log::info!(
                "Bulk upload finished: {} rows imported, {} warnings",
                summary.succeeded,
                summary.warnings
            );
        }
    });

    let body = futures::stream::unfold(rx, |mut rx| async move {
        let entry = rx.recv().await?;
        Some((ndjson_line(&entry), rx))
    });
    Ok(HttpResponse::Ok()
        .content_type("application/x-ndjson")
        .streaming(body))
}

#[derive(Serialize, Debug)]
pub struct PreviewResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    products: Option<Vec<ImportRow>>,
}

/// Parses the uploaded file without importing anything.
#[post("/api/products/bulk/preview")]
pub async fn bulk_preview(form: MultipartForm<BulkUploadForm>) -> HttpResponse {
    let parsed = match read_upload(form.into_inner()).await {
        Ok((bytes, kind)) => parse_rows(&bytes, kind).map_err(ControllerError::from),
        Err(err) => Err(err),
    };
    match parsed {
        Ok(products) => HttpResponse::Ok().json(PreviewResponse {
            success: true,
            message: format!("Successfully parsed {} products", products.len()),
            products: Some(products),
        }),
        Err(err) => {
            log::warn!("Preview rejected: {err}");
            HttpResponse::BadRequest().json(PreviewResponse {
                success: false,
                message: err.public_message(),
                products: None,
            })
        }
    }
}
