//! Output formatters for scan and audit reports

use crate::config::OutputFormat;
use crate::error::Result;
use crate::llm::auditor::{AuditReport, Severity};
use crate::output::report::{humanize_category, MatchTier, ScanReport};
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for rendering reports in one output format
pub trait OutputFormatter {
    fn format_scan(&self, report: &ScanReport) -> Result<String>;
    fn format_audit(&self, report: &AuditReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Terminal formatter with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Dispatches to the formatter for the requested format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn tier_color(tier: MatchTier) -> Color {
        match tier {
            MatchTier::Excellent => Color::Green,
            MatchTier::Strong => Color::BrightGreen,
            MatchTier::Partial => Color::Yellow,
            MatchTier::Weak => Color::Red,
        }
    }

    fn severity_color(severity: Severity) -> Color {
        match severity {
            Severity::High => Color::Red,
            Severity::Medium => Color::Yellow,
            Severity::Low => Color::Cyan,
            Severity::Unknown => Color::White,
        }
    }

    fn score_bar(score: f64) -> String {
        let filled = (score.clamp(0.0, 100.0) / 10.0).round() as usize;
        format!("{}{}", "■".repeat(filled), "□".repeat(10 - filled))
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_scan(&self, report: &ScanReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 ATS SKILL SCAN", 1));
        output.push_str(&format!(
            "Generated: {}\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&format!("Job description: {}\n", report.metadata.requirement_source));
        match &report.metadata.candidate_source {
            Some(candidate) => output.push_str(&format!("Resume: {}\n", candidate)),
            None => output.push_str("Resume: none (listing required skills only)\n"),
        }

        output.push_str(&self.format_header("Match Score", 2));
        output.push_str(&format!(
            "{}% {}\n",
            report.match_score,
            self.colorize(
                &format!("[{}]", report.tier.label()),
                Self::tier_color(report.tier)
            )
        ));

        output.push_str(&self.format_header("Category Breakdown", 2));
        for score in &report.category_scores {
            let weight = match score.weight {
                Some(w) => format!("weight {:.0}%", w * 100.0),
                None => "unweighted".to_string(),
            };
            output.push_str(&format!(
                "  {:<14} {} {:>5.1}%  {}/{} ({})\n",
                humanize_category(&score.category),
                Self::score_bar(score.sub_score),
                score.sub_score,
                score.matched_count,
                score.required_count,
                self.colorize(&weight, Color::BrightBlack)
            ));
        }

        let gaps: Vec<_> = report
            .missing_skills
            .iter()
            .filter(|g| !g.skills.is_empty())
            .collect();
        if !gaps.is_empty() {
            let title = if report.is_single_document() {
                "🔍 Required Skills"
            } else {
                "🚨 Missing Skills"
            };
            output.push_str(&self.format_header(title, 2));
            for gap in gaps {
                output.push_str(&format!(
                    "  {}: {}\n",
                    self.colorize(&humanize_category(&gap.category), Color::Cyan),
                    self.colorize(&gap.skills.join(", "), Color::Red)
                ));
            }
        }

        output.push_str(&self.format_header("📋 Recommendations", 2));
        let shown = if self.detailed {
            report.recommendations.len()
        } else {
            report.recommendations.len().min(5)
        };
        for (i, rec) in report.recommendations.iter().take(shown).enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, rec));
        }

        if self.detailed {
            output.push_str(&self.format_header("Metadata", 3));
            output.push_str(&format!("Scanner version: {}\n", report.metadata.scanner_version));
        }

        Ok(output)
    }

    fn format_audit(&self, report: &AuditReport) -> Result<String> {
        let mut output = String::new();
        let meta = &report.meta_data;

        output.push_str(&self.format_header("🧾 RESUME AUDIT", 1));
        output.push_str(&format!(
            "Candidate: {} | Target role: {} | ~{:.0} years | Language: {}\n",
            meta.candidate_name,
            meta.inferred_target_role,
            meta.years_experience_estimated,
            meta.detected_language
        ));

        output.push_str(&self.format_header("Verdict", 2));
        output.push_str(&format!(
            "{}\n{}\n",
            self.colorize(&report.summary_verdict.headline, Color::Cyan),
            report.summary_verdict.executive_summary
        ));

        output.push_str(&self.format_header("Scores", 2));
        let scores = &report.scores;
        for (label, value) in [
            ("Overall", scores.overall_score),
            ("Impact", scores.impact_score),
            ("Brevity", scores.brevity_score),
            ("Style", scores.style_score),
            ("ATS", scores.ats_compatibility_score),
        ] {
            output.push_str(&format!(
                "  {:<8} {} {:>5.1}\n",
                label,
                Self::score_bar(value),
                value
            ));
        }

        if !report.line_by_line_analysis.is_empty() {
            output.push_str(&self.format_header("Line Findings", 2));
            for finding in &report.line_by_line_analysis {
                output.push_str(&format!(
                    "• {} {} {}\n",
                    self.colorize(
                        &format!("[{:?}]", finding.severity),
                        Self::severity_color(finding.severity)
                    ),
                    finding.issue_type,
                    self.colorize(&format!("({})", finding.section), Color::BrightBlack)
                ));
                output.push_str(&format!("  \"{}\"\n", finding.original_text));
                if self.detailed {
                    output.push_str(&format!("  {}\n", finding.explanation));
                }
                output.push_str(&format!(
                    "  Rewrite: {}\n",
                    self.colorize(&finding.suggested_rewrite, Color::Green)
                ));
            }
        }

        output.push_str(&self.format_header("Structure", 2));
        output.push_str(&format!(
            "Parsable by ATS: {}\n",
            if report.structural_audit.is_parsable {
                self.colorize("yes", Color::Green)
            } else {
                self.colorize("no", Color::Red)
            }
        ));
        for issue in &report.structural_audit.issues_found {
            output.push_str(&format!("  • {}\n", issue));
        }

        let keywords = &report.keyword_analysis;
        output.push_str(&self.format_header("Keywords", 2));
        output.push_str(&format!("Found: {}\n", keywords.hard_skills_found.join(", ")));
        if !keywords.missing_critical_skills.is_empty() {
            output.push_str(&format!(
                "Missing: {}\n",
                self.colorize(&keywords.missing_critical_skills.join(", "), Color::Red)
            ));
        }
        if !keywords.buzzwords_to_remove.is_empty() {
            output.push_str(&format!(
                "Remove: {}\n",
                self.colorize(&keywords.buzzwords_to_remove.join(", "), Color::Yellow)
            ));
        }

        output.push_str(&self.format_header("🚀 Action Plan", 2));
        for (i, action) in report.action_plan.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, action));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_scan(&self, report: &ScanReport) -> Result<String> {
        self.to_json(report)
    }

    fn format_audit(&self, report: &AuditReport) -> Result<String> {
        self.to_json(report)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn tier_badge(tier: MatchTier) -> &'static str {
        match tier {
            MatchTier::Excellent => "🟢",
            MatchTier::Strong => "🟡",
            MatchTier::Partial => "🟠",
            MatchTier::Weak => "🔴",
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_scan(&self, report: &ScanReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# ATS Skill Scan\n\n");
        output.push_str(&format!(
            "**Match score:** {}% {} {}\n\n",
            report.match_score,
            Self::tier_badge(report.tier),
            report.tier.label()
        ));

        output.push_str("## Category Breakdown\n\n");
        output.push_str("| Category | Weight | Matched | Sub-score |\n");
        output.push_str("|----------|--------|---------|-----------|\n");
        for score in &report.category_scores {
            let weight = score
                .weight
                .map(|w| format!("{:.0}%", w * 100.0))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "| {} | {} | {}/{} | {:.1}% |\n",
                humanize_category(&score.category),
                weight,
                score.matched_count,
                score.required_count,
                score.sub_score
            ));
        }
        output.push('\n');

        if report.missing_skills.iter().any(|g| !g.skills.is_empty()) {
            output.push_str(if report.is_single_document() {
                "## Required Skills\n\n"
            } else {
                "## Missing Skills\n\n"
            });
            for gap in report.missing_skills.iter().filter(|g| !g.skills.is_empty()) {
                let skills: Vec<String> = gap.skills.iter().map(|s| format!("`{}`", s)).collect();
                output.push_str(&format!(
                    "- **{}:** {}\n",
                    humanize_category(&gap.category),
                    skills.join(", ")
                ));
            }
            output.push('\n');
        }

        output.push_str("## Recommendations\n\n");
        for (i, rec) in report.recommendations.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, rec));
        }

        if self.include_metadata {
            let meta = &report.metadata;
            output.push_str("\n---\n\n");
            output.push_str(&format!(
                "*Generated {} by ats-scanner {} from `{}`",
                meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                meta.scanner_version,
                meta.requirement_source
            ));
            if let Some(candidate) = &meta.candidate_source {
                output.push_str(&format!(" and `{}`", candidate));
            }
            output.push_str("*\n");
        }

        Ok(output)
    }

    fn format_audit(&self, report: &AuditReport) -> Result<String> {
        let mut output = String::new();
        let meta = &report.meta_data;

        output.push_str(&format!("# Resume Audit: {}\n\n", meta.candidate_name));
        output.push_str(&format!(
            "**Target role:** {} | **Experience:** ~{:.0} years | **Language:** {}\n\n",
            meta.inferred_target_role, meta.years_experience_estimated, meta.detected_language
        ));

        output.push_str(&format!("## {}\n\n", report.summary_verdict.headline));
        output.push_str(&format!("{}\n\n", report.summary_verdict.executive_summary));

        let scores = &report.scores;
        output.push_str("## Scores\n\n");
        output.push_str("| Overall | Impact | Brevity | Style | ATS |\n");
        output.push_str("|---------|--------|---------|-------|-----|\n");
        output.push_str(&format!(
            "| {:.0} | {:.0} | {:.0} | {:.0} | {:.0} |\n\n",
            scores.overall_score,
            scores.impact_score,
            scores.brevity_score,
            scores.style_score,
            scores.ats_compatibility_score
        ));

        if !report.line_by_line_analysis.is_empty() {
            output.push_str("## Line Findings\n\n");
            for finding in &report.line_by_line_analysis {
                output.push_str(&format!(
                    "### {:?}: {} ({})\n\n",
                    finding.severity, finding.issue_type, finding.section
                ));
                output.push_str(&format!("> {}\n\n", finding.original_text));
                output.push_str(&format!("{}\n\n", finding.explanation));
                output.push_str(&format!("**Rewrite:** {}\n\n", finding.suggested_rewrite));
            }
        }

        output.push_str("## Structure\n\n");
        output.push_str(&format!(
            "- Parsable by ATS: {}\n",
            if report.structural_audit.is_parsable { "yes" } else { "no" }
        ));
        for issue in &report.structural_audit.issues_found {
            output.push_str(&format!("- {}\n", issue));
        }
        output.push('\n');

        let keywords = &report.keyword_analysis;
        output.push_str("## Keywords\n\n");
        output.push_str(&format!("- **Found:** {}\n", keywords.hard_skills_found.join(", ")));
        output.push_str(&format!(
            "- **Missing:** {}\n",
            keywords.missing_critical_skills.join(", ")
        ));
        output.push_str(&format!(
            "- **Remove:** {}\n\n",
            keywords.buzzwords_to_remove.join(", ")
        ));

        output.push_str("## Action Plan\n\n");
        for (i, action) in report.action_plan.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, action));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn with_options(
        use_colors: bool,
        detailed: bool,
        pretty_json: bool,
        include_metadata: bool,
    ) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        }
    }

    pub fn generate_scan(&self, report: &ScanReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_scan(report)
    }

    pub fn generate_audit(&self, report: &AuditReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_audit(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(file_path, content)?;
    Ok(())
}

/// File name for a saved report, e.g. `resume_scan.md`.
pub fn suggest_filename(format: OutputFormat, source_name: &str, kind: &str, timestamp: bool) -> String {
    let base_name = Path::new(source_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    };

    format!("{}_{}{}.{}", base_name, kind, timestamp_suffix, extension)
}
