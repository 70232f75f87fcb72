use crate::config::Config;
use anyhow::{Context, Result};
use prep_engine::{CallContext, CancelHandle, CostEstimator, EngineService, PineconeService};
use std::sync::Arc;

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    cost_estimator: CostEstimator,
    engine: EngineService,
    pinecone: PineconeService,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let cost_estimator = CostEstimator::new()?;
        Self::with_cost_estimator(config, cost_estimator)
    }

    pub fn with_cost_estimator(config: Config, cost_estimator: CostEstimator) -> Result<Self> {
        log::info!("Initializing application state...");

        let client = reqwest::Client::builder()
            .user_agent(concat!("prep-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        let engine = EngineService::new(client.clone(), config.engine.clone());
        let pinecone = PineconeService::new(client, config.pinecone.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                cost_estimator,
                engine,
                pinecone,
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn cost_estimator(&self) -> &CostEstimator {
        &self.inner.cost_estimator
    }

    pub fn engine(&self) -> &EngineService {
        &self.inner.engine
    }

    pub fn pinecone(&self) -> &PineconeService {
        &self.inner.pinecone
    }

    /// A fresh deadline for one request's outbound calls.
    pub fn call_context(&self) -> (CallContext, CancelHandle) {
        CallContext::new(self.inner.config.outbound_timeout)
    }
}
