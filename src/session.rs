use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::pdf::{merge_documents, EngineLoader, EngineState};
use crate::source::{fetch_asset, fetch_record_pdf, AssetLocation, RecordService};

pub const DEFAULT_FILE_NAME: &str = "MergedQuote.pdf";

/// A merged PDF ready to hand to the user.
#[derive(Debug, Clone)]
pub struct MergedOutput {
    pub bytes: Vec<u8>,
    pub page_count: u32,
    pub file_name: String,
}

impl MergedOutput {
    pub const MIME_TYPE: &'static str = "application/pdf";

    /// Write the file into `dir` under its file name and return the path.
    pub async fn deliver(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        info!(path = %path.display(), pages = self.page_count, "merged PDF written");
        Ok(path)
    }
}

/// State gathered for one record before the merge action is offered: the
/// engine load outcome and, if the fetch succeeded, the record's PDF.
#[derive(Debug)]
pub struct ConnectedSession {
    pub record_id: String,
    pub engine: EngineState,
    pub record_pdf: Option<Vec<u8>>,
}

/// Load the engine and fetch the record PDF concurrently, returning once
/// both have settled.
///
/// Failures are logged and leave the corresponding state empty; they only
/// turn into errors when [`ConnectedSession::merge`] needs what is missing.
pub async fn connect(
    record_id: &str,
    loader: &EngineLoader,
    records: &dyn RecordService,
) -> ConnectedSession {
    let (engine, record) = tokio::join!(
        loader.ensure_loaded(),
        fetch_record_pdf(records, record_id)
    );

    let record_pdf = match record {
        Ok(bytes) => {
            info!(record_id, bytes = bytes.len(), "record PDF loaded");
            Some(bytes)
        }
        Err(e) => {
            error!(record_id, error = %e, "failed to load record PDF");
            None
        }
    };

    ConnectedSession {
        record_id: record_id.to_string(),
        engine,
        record_pdf,
    }
}

impl ConnectedSession {
    /// Append the static asset's pages after the record PDF's pages.
    ///
    /// The asset is fetched again on every call.
    pub async fn merge(
        &self,
        client: &Client,
        asset: &AssetLocation,
        file_name: &str,
    ) -> Result<MergedOutput> {
        let Some(record_pdf) = self.record_pdf.as_deref() else {
            error!(record_id = %self.record_id, "record PDF not loaded yet");
            return Err(Error::RecordNotLoaded);
        };

        let asset_pdf = fetch_asset(client, asset).await?;
        let engine = self.engine.engine()?;

        let merged = merge_documents(&engine, &[record_pdf, asset_pdf.as_slice()])?;
        info!(
            record_id = %self.record_id,
            pages = merged.page_count,
            bytes = merged.bytes.len(),
            "merged record PDF with {}",
            asset
        );

        Ok(MergedOutput {
            bytes: merged.bytes,
            page_count: merged.page_count,
            file_name: file_name.to_string(),
        })
    }

    /// Merge and write the result into `dir`.
    pub async fn merge_into(
        &self,
        client: &Client,
        asset: &AssetLocation,
        file_name: &str,
        dir: &Path,
    ) -> Result<(MergedOutput, PathBuf)> {
        let output = self.merge(client, asset, file_name).await?;
        let path = output.deliver(dir).await?;
        Ok((output, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{page_texts, sample_pdf};
    use crate::pdf::EngineOptions;
    use crate::source::record::tests::FixedRecords;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use std::collections::HashMap;

    fn records(pages: u32) -> FixedRecords {
        FixedRecords(HashMap::from([(
            "Q-1".to_string(),
            STANDARD.encode(sample_pdf(pages, "Quote")),
        )]))
    }

    fn write_asset(dir: &Path, pages: u32) -> AssetLocation {
        let path = dir.join("kit.pdf");
        std::fs::write(&path, sample_pdf(pages, "Kit")).unwrap();
        AssetLocation::Path(path)
    }

    #[tokio::test]
    async fn test_record_pages_precede_asset_pages() {
        let dir = tempfile::tempdir().unwrap();
        let asset = write_asset(dir.path(), 3);
        let loader = EngineLoader::lopdf(EngineOptions::default());

        let session = connect("Q-1", &loader, &records(2)).await;
        assert!(session.record_pdf.is_some());

        let out_dir = dir.path().join("out");
        let (output, path) = session
            .merge_into(&Client::new(), &asset, DEFAULT_FILE_NAME, &out_dir)
            .await
            .unwrap();

        assert_eq!(output.page_count, 5);
        assert_eq!(path, out_dir.join("MergedQuote.pdf"));
        let written = std::fs::read(&path).unwrap();
        assert_eq!(
            page_texts(&written),
            vec!["Quote-Page-1", "Quote-Page-2", "Kit-Page-1", "Kit-Page-2", "Kit-Page-3"]
        );
    }

    #[tokio::test]
    async fn test_missing_record_blocks_merge() {
        let dir = tempfile::tempdir().unwrap();
        // never created, so any attempt to fetch it would fail with an I/O error
        let asset = AssetLocation::Path(dir.path().join("kit.pdf"));
        let loader = EngineLoader::lopdf(EngineOptions::default());

        let session = connect("Q-404", &loader, &records(1)).await;
        assert!(session.record_pdf.is_none());
        assert!(matches!(session.engine, EngineState::Ready(_)));

        let out_dir = dir.path().join("out");
        let err = session
            .merge_into(&Client::new(), &asset, DEFAULT_FILE_NAME, &out_dir)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::RecordNotLoaded));
        assert!(!out_dir.exists());
    }

    #[tokio::test]
    async fn test_empty_attachment_leaves_buffer_unset() {
        let loader = EngineLoader::lopdf(EngineOptions::default());
        let empty = FixedRecords(HashMap::from([("Q-1".to_string(), String::new())]));

        let session = connect("Q-1", &loader, &empty).await;

        assert!(session.record_pdf.is_none());
    }

    #[tokio::test]
    async fn test_asset_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let asset = AssetLocation::Path(dir.path().join("kit.pdf"));
        let loader = EngineLoader::lopdf(EngineOptions::default());

        let session = connect("Q-1", &loader, &records(1)).await;
        let err = session
            .merge(&Client::new(), &asset, DEFAULT_FILE_NAME)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_unavailable_engine_fails_merge() {
        let dir = tempfile::tempdir().unwrap();
        let asset = write_asset(dir.path(), 1);
        let session = ConnectedSession {
            record_id: "Q-1".to_string(),
            engine: EngineState::Failed("script blocked".to_string()),
            record_pdf: Some(sample_pdf(1, "Quote")),
        };

        let err = session
            .merge(&Client::new(), &asset, DEFAULT_FILE_NAME)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::EngineUnavailable(reason) if reason == "script blocked"));
    }
}
