use anyhow::Result;
use reqwest::Client;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::pdf::EngineLoader;
use crate::session::connect;
use crate::source::RecordService;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MergeRecordRequest {
    #[schemars(description = "ID of the record whose PDF attachment is merged")]
    pub record_id: String,
    #[schemars(description = "Directory to write the merged PDF to (default: configured output directory)")]
    #[serde(default)]
    pub output_dir: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MergeRecordResult {
    pub output_path: String,
    pub page_count: u32,
    pub bytes: usize,
    pub mime_type: String,
}

/// MCP front end for the merge action. One engine loader serves every call.
#[derive(Clone)]
pub struct MergeServer {
    settings: Arc<Settings>,
    client: Client,
    loader: Arc<EngineLoader>,
    records: Arc<dyn RecordService>,
    tool_router: ToolRouter<Self>,
}

impl MergeServer {
    pub fn new(settings: Settings, client: Client) -> Self {
        let loader = EngineLoader::lopdf(settings.engine_options());
        let records = settings.record.record_service(&client);
        Self::with_parts(settings, client, loader, records)
    }

    fn with_parts(
        settings: Settings,
        client: Client,
        loader: EngineLoader,
        records: impl RecordService + 'static,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            client,
            loader: Arc::new(loader),
            records: Arc::new(records),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl MergeServer {
    #[tool(description = "Fetch a record's PDF attachment, append the static sales kit PDF after it, and write the merged file. Returns the output path and page count.")]
    async fn merge_record_pdf(&self, Parameters(req): Parameters<MergeRecordRequest>) -> String {
        let dir = req
            .output_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| self.settings.output_dir.clone());

        let session = connect(&req.record_id, &self.loader, self.records.as_ref()).await;
        match session
            .merge_into(
                &self.client,
                &self.settings.asset,
                &self.settings.file_name,
                &dir,
            )
            .await
        {
            Ok((output, path)) => {
                let result = MergeRecordResult {
                    output_path: path.display().to_string(),
                    page_count: output.page_count,
                    bytes: output.bytes.len(),
                    mime_type: crate::session::MergedOutput::MIME_TYPE.to_string(),
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }
}

#[tool_handler]
impl ServerHandler for MergeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Merges a record's PDF attachment with the static sales kit PDF. Use \
                 merge_record_pdf with the record ID; the merged file is written as \
                 MergedQuote.pdf unless configured otherwise."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server(settings: Settings, client: Client) -> Result<()> {
    let server = MergeServer::new(settings, client);

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecordSettings;
    use crate::pdf::testing::sample_pdf;
    use crate::pdf::EngineOptions;
    use crate::source::record::tests::FixedRecords;
    use crate::source::AssetLocation;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use reqwest::Url;
    use std::collections::HashMap;

    fn server(dir: &std::path::Path) -> MergeServer {
        let asset = dir.join("kit.pdf");
        std::fs::write(&asset, sample_pdf(2, "Kit")).unwrap();
        let settings = Settings {
            record: RecordSettings {
                record_endpoint: Url::parse("http://127.0.0.1:9/unused").unwrap(),
            },
            asset: AssetLocation::Path(asset),
            output_dir: dir.join("out"),
            file_name: "MergedQuote.pdf".to_string(),
            no_compress: false,
        };
        let records = FixedRecords(HashMap::from([(
            "Q-1".to_string(),
            STANDARD.encode(sample_pdf(1, "Quote")),
        )]));
        MergeServer::with_parts(
            settings,
            Client::new(),
            EngineLoader::lopdf(EngineOptions::default()),
            records,
        )
    }

    #[tokio::test]
    async fn test_merge_tool_reports_result() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());

        let response = server
            .merge_record_pdf(Parameters(MergeRecordRequest {
                record_id: "Q-1".to_string(),
                output_dir: None,
            }))
            .await;

        let result: MergeRecordResult = serde_json::from_str(&response).unwrap();
        assert_eq!(result.page_count, 3);
        assert_eq!(result.mime_type, "application/pdf");
        assert!(dir.path().join("out").join("MergedQuote.pdf").exists());
    }

    #[tokio::test]
    async fn test_merge_tool_reports_missing_record() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());

        let response = server
            .merge_record_pdf(Parameters(MergeRecordRequest {
                record_id: "Q-2".to_string(),
                output_dir: None,
            }))
            .await;

        assert_eq!(response, "Error: record PDF not loaded");
    }
}
