// SPDX-License-Identifier: MIT

use super::*;
use std::fs;

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::write(root.join("main.py"), "def main():\n    pass\n").unwrap();
    fs::write(root.join("README.md"), "# fixture\n").unwrap();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/app.py"), "print('hi')\n").unwrap();
    fs::write(root.join("src/index.js"), "console.log('hi')\n").unwrap();
    fs::create_dir_all(root.join("node_modules/react")).unwrap();
    fs::write(root.join("node_modules/react/index.js"), "ignored").unwrap();
    fs::write(
        root.join("requirements.txt"),
        "flask==3.0\nrequests\n",
    )
    .unwrap();

    dir
}

#[tokio::test]
async fn counts_files_and_skips_ignored_dirs() {
    let dir = fixture();
    let analysis = WalkAnalyzer::new().analyze(dir.path()).await.unwrap();

    // node_modules content never counted
    assert_eq!(analysis.summary.total_files, 5);
    assert_eq!(analysis.summary.code_files, 3);
    assert!(analysis.directories.contains(&"src".to_string()));
    assert!(!analysis.directories.iter().any(|d| d.contains("node_modules")));
}

#[tokio::test]
async fn languages_sorted_by_file_count() {
    let dir = fixture();
    let analysis = WalkAnalyzer::new().analyze(dir.path()).await.unwrap();

    assert_eq!(
        analysis.summary.languages,
        vec!["Python".to_string(), "JavaScript".to_string()]
    );
}

#[tokio::test]
async fn detects_frameworks_from_manifests() {
    let dir = fixture();
    let analysis = WalkAnalyzer::new().analyze(dir.path()).await.unwrap();

    assert_eq!(analysis.summary.frameworks, vec!["Flask".to_string()]);
}

#[tokio::test]
async fn missing_directory_is_an_error() {
    let err = WalkAnalyzer::new()
        .analyze(std::path::Path::new("/nonexistent/docket-fixture"))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::Failed(_)));
}

#[tokio::test]
async fn code_files_carry_relative_paths() {
    let dir = fixture();
    let analysis = WalkAnalyzer::new().analyze(dir.path()).await.unwrap();

    assert!(analysis
        .code_files
        .iter()
        .any(|f| f.path == std::path::Path::new("src/app.py")));
}
