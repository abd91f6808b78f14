// SPDX-License-Identifier: MIT

//! Filesystem-walking analyzer with extension heuristics

use super::{Analysis, AnalyzerAdapter, AnalyzerError, CodeFile};
use async_trait::async_trait;
use docket_core::RepoAnalysis;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

/// Directories that never contain project source
const IGNORE_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "venv",
    ".venv",
    "__pycache__",
    "dist",
    "build",
    "out",
    ".next",
    "coverage",
    ".pytest_cache",
    "vendor",
    "target",
    "bin",
    "obj",
];

/// Extensions counted as code and the language they indicate
const LANGUAGES: &[(&str, &str)] = &[
    ("py", "Python"),
    ("js", "JavaScript"),
    ("jsx", "JavaScript (React)"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScript (React)"),
    ("java", "Java"),
    ("cpp", "C++"),
    ("cc", "C++"),
    ("c", "C"),
    ("h", "C"),
    ("go", "Go"),
    ("rs", "Rust"),
    ("rb", "Ruby"),
    ("php", "PHP"),
    ("cs", "C#"),
    ("swift", "Swift"),
    ("kt", "Kotlin"),
    ("scala", "Scala"),
    ("sh", "Shell"),
    ("sql", "SQL"),
];

/// Analyzer that walks the checkout and classifies files by extension
#[derive(Clone, Default)]
pub struct WalkAnalyzer;

impl WalkAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn walk(
        root: &Path,
        dir: &Path,
        analysis: &mut Analysis,
        languages: &mut BTreeMap<String, usize>,
    ) -> Result<(), AnalyzerError> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            if path.is_dir() {
                if IGNORE_DIRS.contains(&name.as_str()) {
                    continue;
                }
                if let Ok(rel) = path.strip_prefix(root) {
                    analysis.directories.push(rel.to_string_lossy().to_string());
                }
                Self::walk(root, &path, analysis, languages)?;
                continue;
            }

            analysis.summary.total_files += 1;

            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            let Some((_, language)) = LANGUAGES.iter().find(|(e, _)| *e == ext) else {
                continue;
            };

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if let Ok(rel) = path.strip_prefix(root) {
                analysis.code_files.push(CodeFile {
                    path: rel.to_path_buf(),
                    extension: ext.clone(),
                    size,
                });
            }
            *languages.entry((*language).to_string()).or_insert(0) += 1;
        }
        Ok(())
    }

    fn detect_frameworks(root: &Path) -> Vec<String> {
        let mut frameworks = BTreeSet::new();

        if let Ok(content) = std::fs::read_to_string(root.join("package.json")) {
            if let Ok(pkg) = serde_json::from_str::<serde_json::Value>(&content) {
                let mut deps = BTreeSet::new();
                for key in ["dependencies", "devDependencies"] {
                    if let Some(map) = pkg.get(key).and_then(|v| v.as_object()) {
                        deps.extend(map.keys().cloned());
                    }
                }
                for (dep, framework) in [
                    ("react", "React"),
                    ("next", "Next.js"),
                    ("vue", "Vue.js"),
                    ("@angular/core", "Angular"),
                    ("express", "Express.js"),
                    ("fastify", "Fastify"),
                ] {
                    if deps.contains(dep) {
                        frameworks.insert(framework.to_string());
                    }
                }
            }
        }

        if let Ok(content) = std::fs::read_to_string(root.join("requirements.txt")) {
            let content = content.to_lowercase();
            for (needle, framework) in [
                ("django", "Django"),
                ("flask", "Flask"),
                ("fastapi", "FastAPI"),
                ("tensorflow", "TensorFlow"),
                ("torch", "PyTorch"),
            ] {
                if content.contains(needle) {
                    frameworks.insert(framework.to_string());
                }
            }
        }

        if root.join("go.mod").exists() {
            frameworks.insert("Go".to_string());
        }
        if root.join("Cargo.toml").exists() {
            frameworks.insert("Cargo".to_string());
        }

        frameworks.into_iter().collect()
    }
}

#[async_trait]
impl AnalyzerAdapter for WalkAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<Analysis, AnalyzerError> {
        if !path.is_dir() {
            return Err(AnalyzerError::Failed(format!(
                "not a directory: {}",
                path.display()
            )));
        }

        let mut analysis = Analysis::default();
        let mut languages = BTreeMap::new();
        Self::walk(path, path, &mut analysis, &mut languages)?;

        // Languages in descending order of file count
        let mut by_count: Vec<(String, usize)> = languages.into_iter().collect();
        by_count.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        analysis.directories.sort();
        analysis.summary = RepoAnalysis {
            total_files: analysis.summary.total_files,
            code_files: analysis.code_files.len(),
            languages: by_count.into_iter().map(|(l, _)| l).collect(),
            frameworks: Self::detect_frameworks(path),
        };

        tracing::debug!(
            path = %path.display(),
            total = analysis.summary.total_files,
            code = analysis.summary.code_files,
            "analyzed working copy"
        );

        Ok(analysis)
    }
}

#[cfg(test)]
#[path = "walk_tests.rs"]
mod tests;
