//! Command-line and environment configuration

use clap::Parser;
use itertools::Itertools;
use std::path::PathBuf;
use trend_core::{RaceKey, TrendError, TrendResult};
use trend_history::{GitHistory, GithubHistory, HistorySource, LoadOptions};
use trend_services::ReportFormat;

/// Default results file tracked in the scraper repository
const DEFAULT_RESULTS_FILE: &str = "results.json";

/// Reconstruct how each race trended from the committed history of a results file
#[derive(Debug, Parser)]
#[command(name = "election-trends", version, about)]
pub struct Args {
    /// Local git clone holding the results file
    #[arg(long, env = "TREND_REPO")]
    pub repo: Option<PathBuf>,

    /// GitHub repository holding the results file, as owner/repo
    #[arg(long, env = "TREND_GITHUB")]
    pub github: Option<String>,

    /// Path of the results file inside the repository
    #[arg(long, env = "TREND_FILE", default_value = DEFAULT_RESULTS_FILE)]
    pub file: String,

    /// Race to track, by state name or position (repeatable; default: all)
    #[arg(long = "race", env = "TREND_RACES", value_delimiter = ',')]
    pub races: Vec<RaceKey>,

    /// Directory the reports are written to
    #[arg(long, env = "TREND_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Report format to write (repeatable; default: text, html and json)
    #[arg(long = "format", env = "TREND_FORMATS", value_delimiter = ',')]
    pub formats: Vec<ReportFormat>,

    /// Revisions fetched at once
    #[arg(long, env = "TREND_CONCURRENCY", default_value_t = 8)]
    pub concurrency: usize,

    /// Only read this many of the newest revisions
    #[arg(long, env = "TREND_MAX_REVISIONS")]
    pub max_revisions: Option<usize>,

    /// GitHub token for higher API rate limits
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,
}

/// Where the history comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    Git {
        repo: PathBuf,
        file: String,
    },
    Github {
        repository: String,
        file: String,
        token: Option<String>,
        max_revisions: Option<usize>,
    },
}

impl SourceConfig {
    /// Build the configured history source
    pub fn build(&self) -> TrendResult<Box<dyn HistorySource>> {
        match self {
            SourceConfig::Git { repo, file } => Ok(Box::new(GitHistory::new(repo.clone(), file.clone()))),
            SourceConfig::Github {
                repository,
                file,
                token,
                max_revisions,
            } => {
                let mut history = GithubHistory::new(repository, file.clone())?;
                if let Some(token) = token {
                    history = history.with_token(token.clone());
                }
                if let Some(max) = max_revisions {
                    history = history.with_max_revisions(*max);
                }
                Ok(Box::new(history))
            }
        }
    }
}

/// Validated configuration
#[derive(Debug, Clone)]
pub struct TrendConfig {
    pub source: SourceConfig,
    pub races: Vec<RaceKey>,
    pub out_dir: PathBuf,
    pub formats: Vec<ReportFormat>,
    pub concurrency: usize,
    pub max_revisions: Option<usize>,
}

impl TrendConfig {
    /// Validate parsed arguments
    pub fn from_args(args: Args) -> TrendResult<Self> {
        let source = match (args.repo, args.github) {
            (Some(repo), None) => SourceConfig::Git {
                repo,
                file: args.file,
            },
            (None, Some(repository)) => SourceConfig::Github {
                repository,
                file: args.file,
                token: args.github_token.filter(|t| !t.trim().is_empty()),
                max_revisions: args.max_revisions,
            },
            (Some(_), Some(_)) => {
                return Err(TrendError::config("Use either --repo or --github, not both"))
            }
            (None, None) => {
                return Err(TrendError::config(
                    "No history source: pass --repo <path> or --github <owner/repo>",
                ))
            }
        };

        if args.concurrency == 0 {
            return Err(TrendError::config("--concurrency must be at least 1"));
        }

        let formats = if args.formats.is_empty() {
            ReportFormat::ALL.to_vec()
        } else {
            args.formats.into_iter().unique().collect()
        };

        Ok(Self {
            source,
            races: args.races,
            out_dir: args.out_dir,
            formats,
            concurrency: args.concurrency,
            max_revisions: args.max_revisions,
        })
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            concurrency: self.concurrency,
            max_revisions: self.max_revisions,
        }
    }
}
