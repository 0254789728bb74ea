//! Integration tests for the ATS scanner

use ats_scanner::config::{Config, OutputFormat};
use ats_scanner::input::manager::InputManager;
use ats_scanner::output::formatter::ReportGenerator;
use ats_scanner::output::report::{MatchTier, ScanReport};
use ats_scanner::SkillMatcher;
use std::path::Path;
use tempfile::TempDir;

const JOB: &str = "tests/fixtures/sample_job.txt";
const RESUME_TXT: &str = "tests/fixtures/sample_resume.txt";
const RESUME_MD: &str = "tests/fixtures/sample_resume.md";

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let mut manager = InputManager::new();
    let path = Path::new(RESUME_TXT);

    let result = manager.extract_text(path).await;
    assert!(result.is_ok());

    let text = result.unwrap();
    assert!(text.contains("Jane Doe"));
    assert!(text.contains("FastAPI"));
    assert!(text.contains("Amazon Web Services"));
}

#[tokio::test]
async fn test_text_extraction_from_markdown() {
    let mut manager = InputManager::new();
    let path = Path::new(RESUME_MD);

    let text = manager.extract_text(path).await.unwrap();
    assert!(text.contains("Jane Doe"));
    assert!(text.contains("Python"));
    // Should not contain markdown formatting
    assert!(!text.contains("**"));
    assert!(!text.contains("##"));
    assert!(!text.contains('`'));
}

#[tokio::test]
async fn test_caching_functionality() {
    let mut manager = InputManager::new();
    let path = Path::new(RESUME_TXT);

    let text1 = manager.extract_text(path).await.unwrap();
    assert_eq!(manager.cache_size(), 1);

    let text2 = manager.extract_text(path).await.unwrap();
    assert_eq!(text1, text2);
    assert_eq!(manager.cache_size(), 1);

    manager.clear_cache();
    assert_eq!(manager.cache_size(), 0);
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/unsupported.xyz");

    assert!(manager.extract_text(path).await.is_err());
    assert!(manager.load_for_audit(path).await.is_err());
}

#[tokio::test]
async fn test_nonexistent_file() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/nonexistent.txt");

    assert!(manager.extract_text(path).await.is_err());
}

#[tokio::test]
async fn test_binary_formats_are_audit_only() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("resume.pdf");
    std::fs::write(&pdf, b"%PDF-1.4 minimal").unwrap();

    let mut manager = InputManager::new();
    assert!(manager.extract_text(&pdf).await.is_err());

    let document = manager.load_for_audit(&pdf).await.unwrap();
    assert_eq!(document.file_name, "resume.pdf");
    assert_eq!(document.mime_type, "application/pdf");
    assert_eq!(document.bytes, b"%PDF-1.4 minimal");
}

#[tokio::test]
async fn test_empty_file_rejected_for_audit() {
    let dir = TempDir::new().unwrap();
    let empty = dir.path().join("empty.png");
    std::fs::write(&empty, b"").unwrap();

    assert!(InputManager::new().load_for_audit(&empty).await.is_err());
}

#[tokio::test]
async fn test_end_to_end_scan() {
    let mut manager = InputManager::new();
    let job = manager.extract_text(Path::new(JOB)).await.unwrap();
    let resume = manager.extract_text(Path::new(RESUME_TXT)).await.unwrap();

    let matcher = SkillMatcher::with_defaults().unwrap();
    let result = matcher.match_documents(&job, &resume);

    // hard 3/6, soft 1/3, tools 1/2, certifications 0/2
    assert_eq!(result.overall_score, 42);

    let hard = result.missing("hard_skills").unwrap();
    assert!(hard.contains(&"sql".to_string()));
    assert!(hard.contains(&"kubernetes".to_string()));
    assert!(hard.contains(&"machine learning".to_string()));
    assert!(!hard.contains(&"aws".to_string()));
    assert_eq!(result.missing("tools").unwrap(), ["jira"]);
    assert_eq!(result.missing("certifications").unwrap().len(), 2);

    let report = ScanReport::from_match(&result, JOB, Some(RESUME_TXT.to_string()));
    assert_eq!(report.tier, MatchTier::Weak);
    assert!(!report.is_single_document());
}

#[tokio::test]
async fn test_markdown_resume_scores_like_text() {
    let mut manager = InputManager::new();
    let job = manager.extract_text(Path::new(JOB)).await.unwrap();
    let txt = manager.extract_text(Path::new(RESUME_TXT)).await.unwrap();
    let md = manager.extract_text(Path::new(RESUME_MD)).await.unwrap();

    let matcher = SkillMatcher::with_defaults().unwrap();
    assert_eq!(
        matcher.match_documents(&job, &txt).overall_score,
        matcher.match_documents(&job, &md).overall_score
    );
}

#[tokio::test]
async fn test_single_document_scan() {
    let mut manager = InputManager::new();
    let job = manager.extract_text(Path::new(JOB)).await.unwrap();

    let matcher = SkillMatcher::with_defaults().unwrap();
    let result = matcher.match_requirements(&job);

    assert_eq!(result.overall_score, 0);
    assert_eq!(result.missing("hard_skills").unwrap().len(), 6);

    let report = ScanReport::from_match(&result, JOB, None);
    assert!(report.is_single_document());

    let markdown = ReportGenerator::with_options(false, false, true, false)
        .generate_scan(&report, OutputFormat::Markdown)
        .unwrap();
    assert!(markdown.contains("## Required Skills"));
}

#[test]
fn test_custom_config_file_drives_matcher() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[matcher.weights]
languages = 1.0

[matcher.synonyms]
rust = ["rustlang"]

[[matcher.taxonomy]]
name = "languages"
skills = ["rust", "go"]

[audit]
endpoint = "http://localhost:1/v1beta/models"
model = "test-model"
api_key_env = "ATS_SCANNER_TEST_KEY"
timeout_seconds = 5
max_retries = 1

[output]
format = "Json"
color_output = false
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.output.format, OutputFormat::Json);

    let matcher = config.matcher.build_matcher().unwrap();
    let result = matcher.match_documents("Rust and Go", "RustLang services");
    assert_eq!(result.overall_score, 50);
    assert_eq!(result.missing("languages").unwrap(), ["go"]);
}

#[test]
fn test_invalid_weights_in_config_fail_to_build() {
    let mut config = Config::default();
    config.matcher.weights = ats_scanner::processing::CategoryWeights::from_pairs([
        ("hard_skills", 0.5),
        ("soft_skills", 0.2),
    ]);

    let err = config.matcher.build_matcher().unwrap_err();
    assert!(err.is_configuration());
}
