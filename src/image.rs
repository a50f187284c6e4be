use async_trait::async_trait;
use reqwest::Client;
use vault_types::asset::{AssetId, AssetKind};
use vault_types::store::DocumentStore;

/// Source of raw image bytes for a URL referenced by a row.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, anyhow::Error>;
}

/// Fetches images over HTTP, optionally through the image proxy endpoint.
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: Client,
    proxy: Option<String>,
}

impl HttpImageFetcher {
    pub fn new(client: Client, proxy: Option<String>) -> Self {
        Self { client, proxy }
    }

    pub fn from_env(client: Client) -> Self {
        let proxy = Some(envmnt::get_or("IMAGE_PROXY_URL", ""))
            .filter(|p| !p.trim().is_empty());
        Self::new(client, proxy)
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        match &self.proxy {
            Some(proxy) => self.client.get(proxy).query(&[("url", url)]),
            None => self.client.get(url),
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, anyhow::Error> {
        let response = self.request(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("HTTP {status} for {url}"));
        }
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(anyhow::anyhow!("Empty response for {url}"));
        }
        Ok(bytes.to_vec())
    }
}

/// Result of the two-tier image lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageResolution {
    Uploaded(AssetId),
    Placeholder(AssetId),
    Unavailable,
}

impl ImageResolution {
    pub fn asset_id(&self) -> Option<&AssetId> {
        match self {
            Self::Uploaded(id) | Self::Placeholder(id) => Some(id),
            Self::Unavailable => None,
        }
    }
}

/// Uploads the image behind `url`, substituting `placeholder_url` once when
/// that fails. Never fails itself: a row without an image is still a row.
pub async fn resolve_image<S, F>(
    store: &S,
    fetcher: &F,
    url: &str,
    placeholder_url: &str,
) -> ImageResolution
where
    S: DocumentStore + ?Sized,
    F: ImageFetcher + ?Sized,
{
    match upload_from_url(store, fetcher, url).await {
        Ok(id) => {
            log::info!("Image uploaded successfully: {id}");
            return ImageResolution::Uploaded(id);
        }
        Err(err) => log::warn!("Failed to upload image {url}: {err:#}"),
    }
    match upload_from_url(store, fetcher, placeholder_url).await {
        Ok(id) => {
            log::warn!("Placeholder image {id} used instead of {url}");
            ImageResolution::Placeholder(id)
        }
        Err(err) => {
            log::error!("Failed to upload placeholder image {placeholder_url}: {err:#}");
            ImageResolution::Unavailable
        }
    }
}

async fn upload_from_url<S, F>(store: &S, fetcher: &F, url: &str) -> Result<AssetId, anyhow::Error>
where
    S: DocumentStore + ?Sized,
    F: ImageFetcher + ?Sized,
{
    let bytes = fetcher.fetch(url).await?;
    let asset = store
        .upload_asset(AssetKind::Image, bytes, filename_from_url(url))
        .await?;
    Ok(asset.id)
}

/// Last path segment of a URL, without query or fragment.
pub fn filename_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && !name.contains(':'))
        .map(ToString::to_string)
}
