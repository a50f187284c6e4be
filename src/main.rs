use actix_multipart::form::MultipartFormConfig;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web::Data, App, HttpServer};
use reqwest::header::{HeaderMap, HeaderValue};
use std::env;
use std::sync::Arc;
use vault_import::image::{HttpImageFetcher, ImageFetcher};
use vault_import::product_import::ImportOptions;
use vault_import::store::{HttpStore, StoreConfig};
use vault_import::{control, SELF_ADDR};
use vault_types::store::DocumentStore;

static DEFAULT_ACCEPT_ENCODING: &str = "br;q=1.0, gzip;q=0.6, deflate;q=0.4, *;q=0.2";

#[actix_web::main]
async fn main() -> Result<(), anyhow::Error> {
    if let Err(env::VarError::NotPresent) = env::var("RUST_LOG") {
        env::set_var("RUST_LOG", "INFO");
    }
    pretty_env_logger::formatted_timed_builder()
        .parse_default_env()
        .init();

    match std::fs::File::open(".env") {
        Ok(_) => envmnt::load_file(".env")?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            std::fs::File::create(".env")?;
            envmnt::load_file(".env")?;
        }
        Err(err) => {
            return Err(anyhow::anyhow!("Unable to open .env file: {err}"));
        }
    }

    let mut headers = HeaderMap::new();
    headers.append(
        reqwest::header::ACCEPT_ENCODING,
        HeaderValue::from_str(DEFAULT_ACCEPT_ENCODING)?,
    );
    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()?;

    let store_config = StoreConfig::from_env()?;
    log::info!(
        "Importing into dataset {} at {}",
        store_config.dataset,
        store_config.base_url()
    );
    let store: Arc<dyn DocumentStore> = Arc::new(HttpStore::new(client.clone(), store_config));
    let fetcher: Arc<dyn ImageFetcher> = Arc::new(HttpImageFetcher::from_env(client.clone()));
    let options = ImportOptions::from_env();

    let port: u16 = envmnt::get_parse("PORT").unwrap_or(8080);
    let upload_limit_mb: usize = envmnt::get_parse("UPLOAD_LIMIT_MB").unwrap_or(20);
    log::info!("Listening on {}:{port}", *SELF_ADDR);

    HttpServer::new(move || {
        App::new()
            .app_data(MultipartFormConfig::default().total_limit(upload_limit_mb * 1024 * 1024))
            .wrap(
                DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
                    .add(("Access-Control-Allow-Headers", "*")),
            )
            .wrap(Logger::default())
            .app_data(Data::new(client.clone()))
            .app_data(Data::new(store.clone()))
            .app_data(Data::new(fetcher.clone()))
            .app_data(Data::new(options.clone()))
            .configure(control::configure)
    })
    .bind((SELF_ADDR.as_str(), port))?
    .run()
    .await?;
    Ok(())
}
