// C Verify CLI
//
// This is the command-line interface for the C Verify tool.

use anyhow::{bail, Context, Result};
use c_verify::analysis::warnings::BugKind;
use c_verify::api::{AnalysisConfig, CVerify, ConfigManager, ReportFormat, ReportFormatter};
use c_verify::classify::BugClassifier;
use c_verify::db::BugStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// C Verify - C Source Defect Analyzer
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a C source file
    Analyze {
        /// Path to the C source file
        #[clap(short, long)]
        input: PathBuf,

        /// Output format (json, text, html)
        #[clap(short, long, default_value = "text")]
        format: String,

        /// Output file path
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Path to configuration file
        #[clap(short, long)]
        config: Option<PathBuf>,

        /// Record the sample and its bugs in a history database
        #[clap(short, long)]
        database: Option<PathBuf>,
    },

    /// Generate a default configuration file
    Config {
        /// Output file path
        #[clap(short, long)]
        output: PathBuf,
    },

    /// Train the classifier from the history database
    Train {
        /// Path to the history database
        #[clap(short, long)]
        database: PathBuf,

        /// Where to save the trained model
        #[clap(short, long)]
        model: PathBuf,

        /// Path to configuration file (sets the classifier threshold)
        #[clap(short, long)]
        config: Option<PathBuf>,
    },

    /// Classify a C source file with a trained model
    Classify {
        /// Path to the C source file
        #[clap(short, long)]
        input: PathBuf,

        /// Path to a trained model
        #[clap(short, long)]
        model: PathBuf,
    },

    /// Show recorded bugs from the history database
    History {
        /// Path to the history database
        #[clap(short, long)]
        database: PathBuf,

        /// Only show bugs of this type (e.g. memory_leak)
        #[clap(short, long)]
        kind: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            format,
            output,
            config,
            database,
        } => {
            let analyzer = if let Some(config_path) = config {
                let config = ConfigManager::load_from_file(&config_path)
                    .context("Failed to load configuration")?;
                CVerify::with_config(config)
            } else {
                CVerify::new()
            };

            let report = if let Some(db_path) = database {
                let store = BugStore::open(&db_path).context("Failed to open database")?;
                analyzer
                    .analyze_and_record(&store, &input)
                    .context("Failed to analyze source file")?
            } else {
                analyzer
                    .analyze_file(&input)
                    .context("Failed to analyze source file")?
            };

            let report_format = ReportFormat::parse(&format).unwrap_or(ReportFormat::Text);

            if let Some(output_path) = output {
                ReportFormatter::save_to_file(&report, &output_path, report_format)
                    .context("Failed to save report")?;
                println!("Report saved to {:?}", output_path);
            } else {
                let report_str = match report_format {
                    ReportFormat::Json => ReportFormatter::to_json(&report)?,
                    ReportFormat::Text => ReportFormatter::to_text(&report),
                    ReportFormat::Html => ReportFormatter::to_html(&report),
                };
                println!("{}", report_str);
            }

            Ok(())
        }
        Commands::Config { output } => {
            let config = AnalysisConfig::default();
            ConfigManager::save_to_file(&config, &output)
                .context("Failed to save configuration")?;
            println!("Default configuration saved to {:?}", output);
            Ok(())
        }
        Commands::Train { database, model, config } => {
            let store = BugStore::open(&database).context("Failed to open database")?;
            let samples = store
                .training_samples()
                .context("Failed to load training samples")?;
            if samples.is_empty() {
                bail!("No samples recorded in {:?}; analyze files with --database first", database);
            }

            let mut classifier = match config {
                Some(config_path) => {
                    let config = ConfigManager::load_from_file(&config_path)
                        .context("Failed to load configuration")?;
                    BugClassifier::new(config.classifier_threshold)
                }
                None => BugClassifier::default(),
            };
            classifier
                .train(&samples)
                .context("Failed to train classifier")?;
            classifier
                .save_to_file(&model)
                .context("Failed to save model")?;
            println!("Trained on {} samples, model saved to {:?}", samples.len(), model);
            Ok(())
        }
        Commands::Classify { input, model } => {
            let classifier =
                BugClassifier::load_from_file(&model).context("Failed to load model")?;
            let source = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {:?}", input))?;

            let predictions = classifier
                .predict(&source)
                .context("Failed to classify source")?;
            if predictions.is_empty() {
                println!("No defect class matched above the model threshold");
            } else {
                for prediction in predictions {
                    println!(
                        "{}: confidence {:.2}",
                        prediction.kind.as_str(),
                        prediction.confidence
                    );
                }
            }
            Ok(())
        }
        Commands::History { database, kind } => {
            let store = BugStore::open(&database).context("Failed to open database")?;
            let bugs = match kind {
                Some(name) => store.bugs_by_kind(&BugKind::from_db_str(&name)),
                None => store.all_bugs(),
            }
            .context("Failed to query database")?;

            println!("{} recorded bugs", bugs.len());
            for bug in bugs {
                println!(
                    "[{}] sample {} line {}: {} ({})",
                    bug.severity.as_str(),
                    bug.sample_id,
                    bug.line,
                    bug.description,
                    bug.kind.as_str()
                );
            }
            Ok(())
        }
    }
}
