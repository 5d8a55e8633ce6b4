//! Where dictionary data comes from.

use flate2::read::GzDecoder;
use reqwest::Client;
use std::future::Future;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::LoadError;
use crate::models::DictionaryData;

/// Asynchronous provider of dictionary data.
///
/// Implementations own fetching and decoding; building and caching the
/// indexed [`Dictionary`](super::Dictionary) is done by
/// [`DictionaryCache`](super::DictionaryCache).
pub trait DictionarySource: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<DictionaryData, LoadError>> + Send;

    /// Human-readable origin for log lines.
    fn describe(&self) -> String;
}

/// Decode JSON, gunzipping first when `gzipped`.
fn decode(bytes: &[u8], gzipped: bool) -> Result<DictionaryData, LoadError> {
    if gzipped {
        let mut json = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut json)?;
        Ok(serde_json::from_slice(&json)?)
    } else {
        Ok(serde_json::from_slice(bytes)?)
    }
}

fn is_gzip_name(name: &str) -> bool {
    name.ends_with(".gz")
}

/// Dictionary JSON (optionally `.gz`) on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DictionarySource for FileSource {
    async fn load(&self) -> Result<DictionaryData, LoadError> {
        let bytes = tokio::fs::read(&self.path).await?;
        debug!("Read {} bytes from {}", bytes.len(), self.path.display());
        decode(&bytes, is_gzip_name(&self.path.to_string_lossy()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Dictionary JSON (optionally `.gz`) served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, LoadError> {
        let url = Url::parse(url)?;
        let client = Client::builder()
            .user_agent("jusho/0.1 (address resolver)")
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }
}

impl DictionarySource for HttpSource {
    async fn load(&self) -> Result<DictionaryData, LoadError> {
        let response = self.client.get(self.url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(LoadError::Status(response.status().as_u16()));
        }

        let bytes = response.bytes().await?;
        debug!("Fetched {} bytes from {}", bytes.len(), self.url);
        decode(&bytes, is_gzip_name(self.url.path()))
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// Already-loaded data handed over by the caller.
#[derive(Debug, Clone)]
pub struct StaticSource {
    data: DictionaryData,
}

impl StaticSource {
    pub fn new(data: DictionaryData) -> Self {
        Self { data }
    }
}

impl DictionarySource for StaticSource {
    async fn load(&self) -> Result<DictionaryData, LoadError> {
        Ok(self.data.clone())
    }

    fn describe(&self) -> String {
        "in-memory data".to_string()
    }
}

/// Source chosen at runtime from configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredSource {
    File(FileSource),
    Http(HttpSource),
}

impl DictionarySource for ConfiguredSource {
    async fn load(&self) -> Result<DictionaryData, LoadError> {
        match self {
            ConfiguredSource::File(source) => source.load().await,
            ConfiguredSource::Http(source) => source.load().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            ConfiguredSource::File(source) => source.describe(),
            ConfiguredSource::Http(source) => source.describe(),
        }
    }
}
