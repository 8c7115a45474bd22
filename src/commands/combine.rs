use anyhow::{Context, Result};
use std::path::Path;

use crate::pdf::{merge_documents, EngineOptions, PdfEngine};

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    first: P,
    second: P,
    output: Q,
    options: EngineOptions,
) -> Result<()> {
    let (first, second, output) = (first.as_ref(), second.as_ref(), output.as_ref());

    let a = std::fs::read(first).with_context(|| format!("Failed to read {}", first.display()))?;
    let b =
        std::fs::read(second).with_context(|| format!("Failed to read {}", second.display()))?;

    let engine = PdfEngine::new(options);
    let merged = merge_documents(&engine, &[a.as_slice(), b.as_slice()])
        .with_context(|| format!("Failed to merge {} and {}", first.display(), second.display()))?;

    std::fs::write(output, &merged.bytes)
        .with_context(|| format!("Failed to save merged PDF: {}", output.display()))?;

    println!(
        "Merged 2 files ({} pages) into {}",
        merged.page_count,
        output.display()
    );

    Ok(())
}
