use reqwest::{Client, Url};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};

/// Where the static PDF appended after the record document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    Url(Url),
    Path(PathBuf),
}

impl FromStr for AssetLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidLocation("empty location".to_string()));
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            let url = Url::parse(s).map_err(|e| Error::InvalidLocation(format!("{}: {}", s, e)))?;
            return Ok(AssetLocation::Url(url));
        }
        if s.starts_with("file://") {
            let path = Url::parse(s)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| Error::InvalidLocation(s.to_string()))?;
            return Ok(AssetLocation::Path(path));
        }
        Ok(AssetLocation::Path(PathBuf::from(s)))
    }
}

impl fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetLocation::Url(url) => write!(f, "{}", url),
            AssetLocation::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetch the static asset's raw bytes. Nothing is cached between calls.
pub async fn fetch_asset(client: &Client, location: &AssetLocation) -> Result<Vec<u8>> {
    let bytes = match location {
        AssetLocation::Url(url) => client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec(),
        AssetLocation::Path(path) => tokio::fs::read(path).await?,
    };
    debug!(asset = %location, bytes = bytes.len(), "fetched static asset");
    Ok(bytes)
}
