//! Audit report contract and the auditor seam

use crate::error::{AtsScannerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A document handed to the auditor unchanged.
#[derive(Debug, Clone)]
pub struct AuditDocument {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Structured audit returned by the inference endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub meta_data: AuditMetaData,
    pub scores: AuditScores,
    pub summary_verdict: SummaryVerdict,
    pub line_by_line_analysis: Vec<LineFinding>,
    pub structural_audit: StructuralAudit,
    pub keyword_analysis: KeywordFindings,
    pub action_plan: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditMetaData {
    pub detected_language: String,
    pub candidate_name: String,
    pub inferred_target_role: String,
    pub years_experience_estimated: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditScores {
    pub overall_score: f64,
    pub impact_score: f64,
    pub brevity_score: f64,
    pub style_score: f64,
    pub ats_compatibility_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryVerdict {
    pub headline: String,
    pub executive_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFinding {
    pub section: String,
    pub original_text: String,
    pub issue_type: String,
    pub severity: Severity,
    pub explanation: String,
    pub suggested_rewrite: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralAudit {
    pub issues_found: Vec<String>,
    pub is_parsable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordFindings {
    pub hard_skills_found: Vec<String>,
    pub missing_critical_skills: Vec<String>,
    pub buzzwords_to_remove: Vec<String>,
}

impl AuditReport {
    /// Parse the model's text output, tolerating markdown code fences.
    pub fn from_model_text(text: &str) -> Result<Self> {
        let text = strip_json_fences(text);
        if text.is_empty() {
            return Err(AtsScannerError::EmptyAuditResponse);
        }
        Ok(serde_json::from_str(text)?)
    }

    pub fn findings_by_severity(&self, severity: Severity) -> impl Iterator<Item = &LineFinding> {
        self.line_by_line_analysis
            .iter()
            .filter(move |f| f.severity == severity)
    }
}

/// Forwards a document to an inference provider and returns its audit.
///
/// All judgment happens remotely; implementations only transport bytes and
/// decode the structured response.
#[async_trait]
pub trait DocumentAuditor: Send + Sync {
    async fn audit(&self, document: &AuditDocument) -> Result<AuditReport>;

    /// Provider/model label for report output.
    fn backend(&self) -> String;
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_AUDIT: &str = r#"{
        "meta_data": {
            "detected_language": "English",
            "candidate_name": "Jane Doe",
            "inferred_target_role": "Backend Engineer",
            "years_experience_estimated": 6
        },
        "scores": {
            "overall_score": 62,
            "impact_score": 55,
            "brevity_score": 70,
            "style_score": 65,
            "ats_compatibility_score": 58
        },
        "summary_verdict": {
            "headline": "Solid core, weak evidence",
            "executive_summary": "Duties listed without measurable outcomes."
        },
        "line_by_line_analysis": [
            {
                "section": "Experience",
                "original_text": "Responsible for backend services",
                "issue_type": "Zombie Bullet",
                "severity": "High",
                "explanation": "No result or metric.",
                "suggested_rewrite": "Cut p95 latency 40% by redesigning the order service"
            },
            {
                "section": "Header",
                "original_text": "cool_dev99@hotmail.com",
                "issue_type": "Unprofessional Email",
                "severity": "Critical",
                "explanation": "Looks unprofessional.",
                "suggested_rewrite": "jane.doe@example.com"
            }
        ],
        "structural_audit": { "issues_found": ["Two-column layout"], "is_parsable": false },
        "keyword_analysis": {
            "hard_skills_found": ["python", "sql"],
            "missing_critical_skills": ["kubernetes"],
            "buzzwords_to_remove": ["synergy"]
        },
        "action_plan": ["Rewrite bullets with metrics", "Switch to a single-column layout"]
    }"#;

    #[test]
    fn test_parse_audit_report() {
        let report = AuditReport::from_model_text(SAMPLE_AUDIT).unwrap();

        assert_eq!(report.meta_data.candidate_name, "Jane Doe");
        assert_eq!(report.scores.overall_score, 62.0);
        assert!(!report.structural_audit.is_parsable);
        assert_eq!(report.findings_by_severity(Severity::High).count(), 1);
        assert_eq!(report.line_by_line_analysis[1].severity, Severity::Unknown);
    }

    #[test]
    fn test_parse_fenced_audit_report() {
        let fenced = format!("```json\n{}\n```", SAMPLE_AUDIT);
        let report = AuditReport::from_model_text(&fenced).unwrap();

        assert_eq!(report.action_plan.len(), 2);
    }

    #[test]
    fn test_empty_audit_text_is_an_error() {
        let err = AuditReport::from_model_text("  ").unwrap_err();
        assert!(matches!(err, AtsScannerError::EmptyAuditResponse));
    }

    #[test]
    fn test_missing_section_is_an_error() {
        let err = AuditReport::from_model_text(r#"{"meta_data": {}}"#).unwrap_err();
        assert!(matches!(err, AtsScannerError::Serialization(_)));
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }
}
