//! Fixed auditor instruction and the JSON schema the audit endpoint must follow

use serde_json::{json, Value};

pub const AUDIT_SYSTEM_INSTRUCTION: &str = r#"You are an elite resume auditor. You simulate the cynical, unforgiving logic of high-end ATS algorithms. You must be aggressively critical.

# Strict Scoring Logic:
Start with a base score of 100. DEDUCT points for every flaw:

1. Formatting & Parser Traps:
   - Tables, multi-columns, or complex layouts: -15 points (Unparsable).
   - Use of graphics, photos, or icons: -5 points.
   - Non-standard/Creative Headers (e.g., "My Journey") instead of standard ("Experience"): -10 points.
   - Generic File Name (e.g., "Resume.pdf"): -5 points.

2. Content Specificity & Quality:
   - "Soft Skill Stuffing": Listing generic words (Communication, Leadership) without matching hard tech skills (e.g., Python, SAP): -15 points.
   - "Zombie Bullets": Bullet points that are just lists of duties with NO results or metrics: -3 points PER bullet (Max -20).
   - "Responsible for..." used more than twice: -10 points.
   - Word Count Penalty: Too short (< 400 words) or too long (> 1,000 words): -10 points.

3. Precision & Professionalism:
   - Date Formatting: Dates missing months (e.g., "2020 - 2021" instead of "May 2020"): -5 points.
   - Unprofessional Email (e.g., cool_boy99@hotmail): -5 points.
   - Missing Generic Location (City, Country) or clickable LinkedIn URL: -5 points per item.
   - Role Inconsistency: Missing top 3 industry-standard keywords for the inferred role: -15 points.

Final Score = 100 - (Total Deductions). Minimum is 0.

Output:
- Return ONLY a valid JSON object matching the provided schema.
- Language: Values MUST match the resume's language. Keys remain English."#;

/// User turn sent alongside the inline document.
pub fn audit_user_prompt(file_name: &str) -> String {
    format!(
        "Filename: {}. Execute a deterministic forensic audit. Be cynical. Use the provided JSON schema.",
        file_name
    )
}

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

/// Response schema matching [`crate::llm::auditor::AuditReport`].
pub fn audit_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "meta_data": {
                "type": "OBJECT",
                "properties": {
                    "detected_language": { "type": "STRING" },
                    "candidate_name": { "type": "STRING" },
                    "inferred_target_role": { "type": "STRING" },
                    "years_experience_estimated": { "type": "NUMBER" }
                },
                "required": ["detected_language", "candidate_name", "inferred_target_role", "years_experience_estimated"]
            },
            "scores": {
                "type": "OBJECT",
                "properties": {
                    "overall_score": { "type": "NUMBER" },
                    "impact_score": { "type": "NUMBER" },
                    "brevity_score": { "type": "NUMBER" },
                    "style_score": { "type": "NUMBER" },
                    "ats_compatibility_score": { "type": "NUMBER" }
                },
                "required": ["overall_score", "impact_score", "brevity_score", "style_score", "ats_compatibility_score"]
            },
            "summary_verdict": {
                "type": "OBJECT",
                "properties": {
                    "headline": { "type": "STRING" },
                    "executive_summary": { "type": "STRING" }
                },
                "required": ["headline", "executive_summary"]
            },
            "line_by_line_analysis": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "section": { "type": "STRING" },
                        "original_text": { "type": "STRING" },
                        "issue_type": { "type": "STRING" },
                        "severity": { "type": "STRING", "enum": ["High", "Medium", "Low"] },
                        "explanation": { "type": "STRING" },
                        "suggested_rewrite": { "type": "STRING" }
                    },
                    "required": ["section", "original_text", "issue_type", "severity", "explanation", "suggested_rewrite"]
                }
            },
            "structural_audit": {
                "type": "OBJECT",
                "properties": {
                    "issues_found": string_array(),
                    "is_parsable": { "type": "BOOLEAN" }
                },
                "required": ["issues_found", "is_parsable"]
            },
            "keyword_analysis": {
                "type": "OBJECT",
                "properties": {
                    "hard_skills_found": string_array(),
                    "missing_critical_skills": string_array(),
                    "buzzwords_to_remove": string_array()
                },
                "required": ["hard_skills_found", "missing_critical_skills", "buzzwords_to_remove"]
            },
            "action_plan": string_array()
        },
        "required": [
            "meta_data",
            "scores",
            "summary_verdict",
            "line_by_line_analysis",
            "structural_audit",
            "keyword_analysis",
            "action_plan"
        ]
    })
}
