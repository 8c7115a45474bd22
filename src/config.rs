use clap::Args;
use reqwest::{Client, Url};
use std::path::PathBuf;

use crate::pdf::EngineOptions;
use crate::session::DEFAULT_FILE_NAME;
use crate::source::{AssetLocation, HttpRecordService};

#[derive(Args, Debug, Clone)]
pub struct RecordSettings {
    /// Attachment method endpoint, called with the record ID
    #[arg(long, env = "QUOTEMERGE_RECORD_ENDPOINT")]
    pub record_endpoint: Url,
}

impl RecordSettings {
    pub fn record_service(&self, client: &Client) -> HttpRecordService {
        HttpRecordService::new(client.clone(), self.record_endpoint.clone())
    }
}

#[derive(Args, Debug, Clone)]
pub struct Settings {
    #[command(flatten)]
    pub record: RecordSettings,

    /// Static PDF appended after the record PDF (http(s) URL or path)
    #[arg(long, env = "QUOTEMERGE_ASSET", value_parser = parse_asset)]
    pub asset: AssetLocation,

    /// Directory the merged PDF is written to
    #[arg(long, env = "QUOTEMERGE_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// File name of the merged PDF
    #[arg(long, env = "QUOTEMERGE_FILE_NAME", default_value = DEFAULT_FILE_NAME)]
    pub file_name: String,

    /// Write uncompressed streams
    #[arg(long, env = "QUOTEMERGE_NO_COMPRESS")]
    pub no_compress: bool,
}

impl Settings {
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            compress: !self.no_compress,
            ..Default::default()
        }
    }
}

fn parse_asset(s: &str) -> Result<AssetLocation, String> {
    s.parse().map_err(|e: crate::error::Error| e.to_string())
}
