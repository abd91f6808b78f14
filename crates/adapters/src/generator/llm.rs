// SPDX-License-Identifier: MIT

//! LLM-backed documentation generator
//!
//! Talks to an OpenAI-compatible chat-completion endpoint. One request per
//! document; re-running a job regenerates every document, which is safe
//! because the archive stage replaces the whole artifact set.

use super::prompts;
use super::{DocSet, GeneratorAdapter, GeneratorError};
use crate::analyzer::{Analysis, CodeFile};
use crate::repo::Checkout;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// How many folder READMEs and per-file docs to generate at most
const MAX_FOLDER_DOCS: usize = 6;
const MAX_FILE_DOCS: usize = 5;
/// Excerpt budget per file handed to the model
const MAX_EXCERPT_BYTES: usize = 4_000;

/// Connection settings for the completion endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
        }
    }
}

/// Generator backed by a chat-completion API
#[derive(Clone)]
pub struct LlmGenerator {
    config: LlmConfig,
}

impl LlmGenerator {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }

    async fn chat(&self, system: &str, user: String) -> Result<String, GeneratorError> {
        let config = self.config.clone();
        let body = serde_json::json!({
            "model": config.model,
            "temperature": 0,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        // ureq is blocking; keep it off the async workers
        let content = tokio::task::spawn_blocking(move || -> Result<String, GeneratorError> {
            let mut response = ureq::post(&config.endpoint)
                .header("Authorization", &format!("Bearer {}", config.api_key))
                .send_json(&body)
                .map_err(|e| GeneratorError::Upstream(e.to_string()))?;
            let parsed: serde_json::Value = response
                .body_mut()
                .read_json()
                .map_err(|e| GeneratorError::Upstream(e.to_string()))?;
            parsed["choices"][0]["message"]["content"]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| {
                    GeneratorError::Upstream("malformed completion response".to_string())
                })
        })
        .await
        .map_err(|e| GeneratorError::Failed(e.to_string()))??;

        Ok(content)
    }
}

#[async_trait]
impl GeneratorAdapter for LlmGenerator {
    async fn generate(
        &self,
        checkout: &Checkout,
        analysis: &Analysis,
    ) -> Result<DocSet, GeneratorError> {
        let languages = analysis.summary.languages.join(", ");
        let frameworks = analysis.summary.frameworks.join(", ");

        tracing::info!(repo = %checkout.repo_name, model = %self.config.model, "generating documentation");

        let main_readme = self
            .chat(
                prompts::MAIN_README_SYSTEM,
                prompts::MAIN_README_USER
                    .replace("{repo_name}", &checkout.repo_name)
                    .replace("{languages}", &languages)
                    .replace("{frameworks}", &frameworks)
                    .replace("{file_tree}", &file_tree(analysis)),
            )
            .await?;

        let mut folder_readmes = BTreeMap::new();
        for (folder, files) in group_by_folder(&analysis.code_files)
            .into_iter()
            .take(MAX_FOLDER_DOCS)
        {
            let names: Vec<String> = files
                .iter()
                .map(|f| f.path.to_string_lossy().to_string())
                .collect();
            let samples: String = files
                .iter()
                .take(3)
                .map(|f| excerpt(&checkout.path.join(&f.path)))
                .collect::<Vec<_>>()
                .join("\n---\n");

            let content = self
                .chat(
                    prompts::FOLDER_README_SYSTEM,
                    prompts::FOLDER_README_USER
                        .replace("{folder}", &folder)
                        .replace("{repo_name}", &checkout.repo_name)
                        .replace("{files}", &names.join("\n"))
                        .replace("{samples}", &samples),
                )
                .await?;
            folder_readmes.insert(folder, content);
        }

        let mut detailed_docs = BTreeMap::new();
        let mut by_size: Vec<&CodeFile> = analysis.code_files.iter().collect();
        by_size.sort_by(|a, b| b.size.cmp(&a.size));
        for file in by_size.into_iter().take(MAX_FILE_DOCS) {
            let rel = file.path.to_string_lossy().to_string();
            let content = self
                .chat(
                    prompts::FILE_DOC_SYSTEM,
                    prompts::FILE_DOC_USER
                        .replace("{path}", &rel)
                        .replace("{repo_name}", &checkout.repo_name)
                        .replace("{content}", &excerpt(&checkout.path.join(&file.path))),
                )
                .await?;
            detailed_docs.insert(rel, content);
        }

        let setup_guide = self
            .chat(
                prompts::SETUP_GUIDE_SYSTEM,
                prompts::SETUP_GUIDE_USER
                    .replace("{repo_name}", &checkout.repo_name)
                    .replace("{languages}", &languages)
                    .replace("{frameworks}", &frameworks)
                    .replace("{manifests}", &manifests(&checkout.path)),
            )
            .await?;

        Ok(DocSet {
            main_readme,
            folder_readmes,
            detailed_docs,
            setup_guide,
        })
    }
}

fn file_tree(analysis: &Analysis) -> String {
    let mut lines: Vec<String> = analysis
        .directories
        .iter()
        .map(|d| format!("{}/", d))
        .collect();
    lines.extend(
        analysis
            .code_files
            .iter()
            .map(|f| f.path.to_string_lossy().to_string()),
    );
    lines.sort();
    lines.truncate(200);
    lines.join("\n")
}

fn group_by_folder(code_files: &[CodeFile]) -> BTreeMap<String, Vec<&CodeFile>> {
    let mut grouped: BTreeMap<String, Vec<&CodeFile>> = BTreeMap::new();
    for file in code_files {
        let folder = file
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());
        grouped.entry(folder).or_default().push(file);
    }
    grouped
}

fn excerpt(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(mut content) => {
            if content.len() > MAX_EXCERPT_BYTES {
                let mut cut = MAX_EXCERPT_BYTES;
                while !content.is_char_boundary(cut) {
                    cut -= 1;
                }
                content.truncate(cut);
                content.push_str("\n[truncated]");
            }
            content
        }
        Err(e) => format!("[unreadable: {}]", e),
    }
}

fn manifests(root: &Path) -> String {
    let mut sections = Vec::new();
    for name in [
        "requirements.txt",
        "pyproject.toml",
        "package.json",
        "Cargo.toml",
        "go.mod",
        "Makefile",
        "docker-compose.yml",
    ] {
        let path = root.join(name);
        if path.exists() {
            sections.push(format!("## {}\n{}", name, excerpt(&path)));
        }
    }
    if sections.is_empty() {
        "none found".to_string()
    } else {
        sections.join("\n\n")
    }
}
