use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::pdf::{EngineOptions, PdfEngine};

/// Something that can produce a ready PDF engine.
#[async_trait]
pub trait EngineSource: Send + Sync {
    async fn load(&self) -> Result<PdfEngine>;
}

/// Builds the lopdf-backed engine from options.
pub struct LopdfSource {
    options: EngineOptions,
}

impl LopdfSource {
    pub fn new(options: EngineOptions) -> Self {
        LopdfSource { options }
    }
}

#[async_trait]
impl EngineSource for LopdfSource {
    async fn load(&self) -> Result<PdfEngine> {
        Ok(PdfEngine::new(self.options.clone()))
    }
}

#[derive(Debug, Clone)]
pub enum EngineState {
    Ready(Arc<PdfEngine>),
    Failed(String),
}

impl EngineState {
    /// The engine, or the reason there is none
    pub fn engine(&self) -> Result<Arc<PdfEngine>> {
        match self {
            EngineState::Ready(engine) => Ok(Arc::clone(engine)),
            EngineState::Failed(reason) => Err(Error::EngineUnavailable(reason.clone())),
        }
    }
}

/// Loads the engine at most once per loader.
///
/// The outcome of the first load, success or failure, is what every later
/// caller sees. A failed load is not retried.
pub struct EngineLoader {
    source: Box<dyn EngineSource>,
    state: OnceCell<EngineState>,
}

impl EngineLoader {
    pub fn new(source: impl EngineSource + 'static) -> Self {
        EngineLoader {
            source: Box::new(source),
            state: OnceCell::new(),
        }
    }

    pub fn lopdf(options: EngineOptions) -> Self {
        Self::new(LopdfSource::new(options))
    }

    pub async fn ensure_loaded(&self) -> EngineState {
        self.state
            .get_or_init(|| async {
                match self.source.load().await {
                    Ok(engine) => {
                        info!("PDF engine loaded");
                        EngineState::Ready(Arc::new(engine))
                    }
                    Err(e) => {
                        error!(error = %e, "failed to load PDF engine");
                        EngineState::Failed(e.to_string())
                    }
                }
            })
            .await
            .clone()
    }
}
