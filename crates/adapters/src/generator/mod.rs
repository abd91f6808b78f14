// SPDX-License-Identifier: MIT

//! Documentation generator adapter

pub mod fake;
mod llm;
mod prompts;

pub use llm::{LlmConfig, LlmGenerator};

use super::analyzer::Analysis;
use super::repo::Checkout;
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Generated documentation artifact set
///
/// Keys in the maps are checkout-relative paths (folders for
/// `folder_readmes`, files for `detailed_docs`).
#[derive(Debug, Clone, Default)]
pub struct DocSet {
    pub main_readme: String,
    pub folder_readmes: BTreeMap<String, String>,
    pub detailed_docs: BTreeMap<String, String>,
    pub setup_guide: String,
}

/// Errors from the generating stage, including upstream-LLM failures
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("llm request failed: {0}")]
    Upstream(String),
    #[error("generation failed: {0}")]
    Failed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Adapter for the generating stage
#[async_trait]
pub trait GeneratorAdapter: Clone + Send + Sync + 'static {
    async fn generate(
        &self,
        checkout: &Checkout,
        analysis: &Analysis,
    ) -> Result<DocSet, GeneratorError>;
}
