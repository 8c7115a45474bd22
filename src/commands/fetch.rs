use anyhow::{Context, Result};
use reqwest::Client;
use std::path::Path;

use crate::config::RecordSettings;
use crate::source::fetch_record_pdf;

pub async fn run<P: AsRef<Path>>(
    record_id: &str,
    output: P,
    settings: &RecordSettings,
    client: &Client,
) -> Result<()> {
    let output = output.as_ref();
    let records = settings.record_service(client);

    let bytes = fetch_record_pdf(&records, record_id)
        .await
        .with_context(|| format!("Failed to fetch PDF for record {}", record_id))?;

    tokio::fs::write(output, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Wrote {} bytes for record {} to {}",
        bytes.len(),
        record_id,
        output.display()
    );

    Ok(())
}
