//! ATS scanner: skill taxonomy matching for resumes and job descriptions

use ats_scanner::cli::{self, Cli, Commands, ConfigAction};
use ats_scanner::config::{Config, OutputFormat};
use ats_scanner::error::{AtsScannerError, Result};
use ats_scanner::input::InputManager;
use ats_scanner::llm::{DocumentAuditor, GeminiAuditor};
use ats_scanner::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use ats_scanner::output::report::ScanReport;
use clap::Parser;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    if let Err(e) = run_command(cli.command, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config_path: &Path) -> Result<()> {
    match command {
        Commands::Scan {
            job,
            resume,
            output,
            detailed,
            save,
        } => {
            let config = Config::load_from(config_path)?;

            cli::validate_file_extension(&job, &["txt", "md", "markdown"])
                .map_err(|e| AtsScannerError::InvalidInput(format!("Job description file: {}", e)))?;
            if let Some(resume) = &resume {
                cli::validate_file_extension(resume, &["txt", "md", "markdown"])
                    .map_err(|e| AtsScannerError::InvalidInput(format!("Resume file: {}", e)))?;
            }

            let format = resolve_format(output.as_deref(), &config)?;
            let matcher = config.matcher.build_matcher()?;
            info!(
                "Loaded taxonomy: {} categories, {} skills",
                matcher.taxonomy().categories().len(),
                matcher.taxonomy().skill_count()
            );
            let mut input_manager = InputManager::new();

            info!("Reading job description: {}", job.display());
            let job_text = input_manager.extract_text(&job).await?;

            let result = match &resume {
                Some(resume_path) => {
                    info!("Reading resume: {}", resume_path.display());
                    let resume_text = input_manager.extract_text(resume_path).await?;
                    matcher.match_documents(&job_text, &resume_text)
                }
                None => matcher.match_requirements(&job_text),
            };

            let report = ScanReport::from_match(
                &result,
                job.display().to_string(),
                resume.as_ref().map(|p| p.display().to_string()),
            );
            info!(
                "Scan complete: {}% ({}), {} missing skills",
                report.match_score,
                report.tier,
                result.total_missing()
            );

            let generator = ReportGenerator::with_options(
                config.output.color_output && save.is_none(),
                detailed,
                true,
                true,
            );
            let rendered = generator.generate_scan(&report, format)?;
            let source = resume.as_ref().unwrap_or(&job).display().to_string();
            emit(&rendered, save, format, &source, "scan")?;
        }

        Commands::Audit { file, output, save } => {
            let config = Config::load_from(config_path)?;
            let format = resolve_format(output.as_deref(), &config)?;
            let auditor = GeminiAuditor::from_config(&config.audit)?;
            let document = InputManager::new().load_for_audit(&file).await?;

            println!("🔍 Auditing {} with {}...", document.file_name, auditor.backend());
            let report = auditor.audit(&document).await?;

            let generator =
                ReportGenerator::with_options(config.output.color_output && save.is_none(), true, true, true);
            let rendered = generator.generate_audit(&report, format)?;
            emit(&rendered, save, format, &document.file_name, "audit")?;
        }

        Commands::Config { action } => run_config(action, config_path)?,
    }

    Ok(())
}

fn run_config(action: Option<ConfigAction>, config_path: &Path) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let config = Config::load_from(config_path)?;
            println!("⚙️  Current Configuration ({})\n", config_path.display());
            println!("{}", config.to_toml()?);
        }
        // Does not read the existing file, so a broken config can still be reset.
        Some(ConfigAction::Reset) => {
            println!("🔄 Resetting configuration to defaults...");
            Config::reset(config_path)?;
            println!("✅ Configuration reset: {}", config_path.display());
        }
        Some(ConfigAction::Path) => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

fn resolve_format(requested: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match requested {
        Some(format) => cli::parse_output_format(format).map_err(AtsScannerError::InvalidInput),
        None => Ok(config.output.format),
    }
}

/// Print the report, or write it to `save`; a directory gets a generated file name.
fn emit(
    rendered: &str,
    save: Option<PathBuf>,
    format: OutputFormat,
    source: &str,
    kind: &str,
) -> Result<()> {
    match save {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(suggest_filename(format, source, kind, true))
            } else {
                path
            };
            save_report_to_file(rendered, &path)?;
            println!("💾 Report saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
