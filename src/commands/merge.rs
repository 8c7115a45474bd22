use anyhow::{Context, Result};
use reqwest::Client;

use crate::config::Settings;
use crate::pdf::EngineLoader;
use crate::session::connect;

pub async fn run(record_id: &str, settings: &Settings, client: &Client) -> Result<()> {
    let loader = EngineLoader::lopdf(settings.engine_options());
    let records = settings.record.record_service(client);

    let session = connect(record_id, &loader, &records).await;
    let (output, path) = session
        .merge_into(
            client,
            &settings.asset,
            &settings.file_name,
            &settings.output_dir,
        )
        .await
        .with_context(|| format!("Failed to merge PDF for record {}", record_id))?;

    println!(
        "Merged record {} with {} ({} pages) into {}",
        record_id,
        settings.asset,
        output.page_count,
        path.display()
    );

    Ok(())
}
