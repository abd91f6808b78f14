// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! docket-adapters: collaborator integrations for the pipeline stages
//!
//! One adapter per stage boundary: repo (clone), analyzer, generator, and
//! archive (upload). Each is a trait with a real implementation and a fake
//! for tests; the runner only ever sees the traits.

pub mod analyzer;
pub mod archive;
pub mod generator;
pub mod repo;

pub use analyzer::{Analysis, AnalyzerAdapter, AnalyzerError, CodeFile, WalkAnalyzer};
pub use archive::{ArchiveAdapter, ArchiveError, LocalArchive};
pub use generator::{DocSet, GeneratorAdapter, GeneratorError, LlmConfig, LlmGenerator};
pub use repo::{repo_name, validate_reference, Checkout, GitRepoAdapter, RepoAdapter, RepoError};

#[cfg(any(test, feature = "test-support"))]
pub use analyzer::fake::FakeAnalyzer;
#[cfg(any(test, feature = "test-support"))]
pub use archive::fake::FakeArchive;
#[cfg(any(test, feature = "test-support"))]
pub use generator::fake::FakeGenerator;
#[cfg(any(test, feature = "test-support"))]
pub use repo::fake::FakeRepoAdapter;

/// The full set of collaborators a pipeline runner needs
pub trait Adapters: Clone + Send + Sync + 'static {
    type Repos: RepoAdapter;
    type Analyzer: AnalyzerAdapter;
    type Generator: GeneratorAdapter;
    type Archive: ArchiveAdapter;

    fn repos(&self) -> &Self::Repos;
    fn analyzer(&self) -> &Self::Analyzer;
    fn generator(&self) -> &Self::Generator;
    fn archive(&self) -> &Self::Archive;
}

/// Fake adapter set for engine and daemon tests
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone, Default)]
pub struct FakeAdapters {
    pub repos: FakeRepoAdapter,
    pub analyzer: FakeAnalyzer,
    pub generator: FakeGenerator,
    pub archive: FakeArchive,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeAdapters {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Adapters for FakeAdapters {
    type Repos = FakeRepoAdapter;
    type Analyzer = FakeAnalyzer;
    type Generator = FakeGenerator;
    type Archive = FakeArchive;

    fn repos(&self) -> &FakeRepoAdapter {
        &self.repos
    }
    fn analyzer(&self) -> &FakeAnalyzer {
        &self.analyzer
    }
    fn generator(&self) -> &FakeGenerator {
        &self.generator
    }
    fn archive(&self) -> &FakeArchive {
        &self.archive
    }
}
