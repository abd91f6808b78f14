// SPDX-License-Identifier: MIT

//! Fake generator for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DocSet, GeneratorAdapter, GeneratorError};
use crate::analyzer::Analysis;
use crate::repo::Checkout;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Fake generator returning canned documents
#[derive(Clone, Default)]
pub struct FakeGenerator {
    fail_with: Arc<Mutex<Option<String>>>,
    calls: Arc<AtomicUsize>,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail_with.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeneratorAdapter for FakeGenerator {
    async fn generate(
        &self,
        checkout: &Checkout,
        _analysis: &Analysis,
    ) -> Result<DocSet, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self
            .fail_with
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(GeneratorError::Upstream(message));
        }

        Ok(DocSet {
            main_readme: format!("# {}\n\nGenerated documentation.\n", checkout.repo_name),
            folder_readmes: BTreeMap::from([(
                "src".to_string(),
                "# src\n\nSource files.\n".to_string(),
            )]),
            detailed_docs: BTreeMap::from([(
                "main.py".to_string(),
                "Entry point.\n".to_string(),
            )]),
            setup_guide: "# Setup\n\nNo dependencies.\n".to_string(),
        })
    }
}
