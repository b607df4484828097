use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use hexid::decode::{CandidateExtractor, Ranker};
use hexid::{
    load_params, AllowListValidator, IdRecoverer, PipelineResult, RecognitionError,
    RecoveryConfig, RecoveryIoError, RecoveryParams, TesseractRecognizer, ValidatorError,
};

/// Exit code for runs that completed without an identifier.
const EXIT_NOT_RECOVERED: u8 = 2;

#[derive(Parser)]
#[command(name = "hexid", version)]
#[command(about = "Recover a 16-character hex identifier from a screenshot with colored overlay text")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline on one image
    Recover {
        image: PathBuf,
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Path to the tesseract executable
        #[arg(long, default_value = "tesseract")]
        tesseract: PathBuf,
        /// Newline-separated list of known ids used as validator
        #[arg(long)]
        known_ids: Option<PathBuf>,
        /// Accept the best candidate without validation
        #[arg(long)]
        no_validate: bool,
        /// Print the full recovery report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rank candidates found in raw recognizer text
    Candidates {
        #[arg(required = true)]
        texts: Vec<String>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write the preprocessed variants of an image as PNG files
    Variants {
        image: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default JSON configuration
    DefaultConfig,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("{path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] RecoveryIoError),
    #[error(transparent)]
    Validator(#[from] ValidatorError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    #[cfg(feature = "tracing")]
    {
        let _ = verbose;
        let _ = tracing_log::LogTracer::init();
        hexid::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = hexid::core::init_with_level(hexid::core::level_from_verbosity(verbose));
    }
}

fn run(command: Command) -> Result<ExitCode, CliError> {
    match command {
        Command::Recover {
            image,
            config,
            tesseract,
            known_ids,
            no_validate,
            json,
        } => {
            let mut params = load_params(config.as_deref())?;
            if no_validate {
                params.validate = false;
            }
            let bytes = read(&image)?;
            let mut recoverer = IdRecoverer::new(params, TesseractRecognizer::new(tesseract));
            if let Some(path) = known_ids {
                recoverer = recoverer.with_validator(AllowListValidator::from_file(path)?);
            }
            let report = recoverer.run(&bytes);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                match &report.result {
                    PipelineResult::Recovered(id) => println!("{id}"),
                    PipelineResult::UnverifiedBestEffort(id) => println!("{id} (unverified)"),
                    PipelineResult::Failed(reason) => println!("not recovered: {reason}"),
                }
            }
            Ok(exit_for(&report.result))
        }
        Command::Candidates { texts, config } => {
            let params = load_params(config.as_deref())?;
            let table = CandidateExtractor::new(params.extract)
                .extract_all(texts.iter().map(String::as_str));
            for c in Ranker::new(params.rank).rank(&table) {
                println!("{} {} {:.2} {}", c.score, c.votes, c.hex_purity, c.value);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Variants {
            image,
            out_dir,
            config,
        } => {
            let params = load_params(config.as_deref())?;
            let bytes = read(&image)?;
            let variants = match no_recognizer(params).render_variants(&bytes) {
                Ok(variants) => variants,
                Err(reason) => {
                    println!("no variants: {reason}");
                    return Ok(ExitCode::from(EXIT_NOT_RECOVERED));
                }
            };
            fs::create_dir_all(&out_dir)?;
            for (i, variant) in variants.iter().enumerate() {
                let path = out_dir.join(format!("{i:02}_{}.png", file_stem(&variant.strategy.to_string())));
                fs::write(&path, &variant.png)?;
                println!("{}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::DefaultConfig => {
            let cfg = RecoveryConfig::from_params(&RecoveryParams::default());
            println!("{}", serde_json::to_string_pretty(&cfg)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Rendering variants never reaches the recognizer.
fn no_recognizer(params: RecoveryParams) -> IdRecoverer {
    IdRecoverer::new(params, |_: &[u8]| {
        Err::<String, _>(RecognitionError::Unavailable("not used".into()))
    })
}

fn exit_for(result: &PipelineResult) -> ExitCode {
    if result.is_failed() {
        ExitCode::from(EXIT_NOT_RECOVERED)
    } else {
        ExitCode::SUCCESS
    }
}

fn file_stem(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}
