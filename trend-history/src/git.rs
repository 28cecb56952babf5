//! Local git clone as a history source

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, instrument};
use trend_core::{TrendError, TrendResult};

use crate::source::HistorySource;

/// Reads revisions of a results file from a local git repository
#[derive(Debug, Clone)]
pub struct GitHistory {
    repo: PathBuf,
    path: String,
    label: String,
}

impl GitHistory {
    /// Track `path` (relative to the repository root) in the clone at `repo`
    pub fn new(repo: impl Into<PathBuf>, path: impl Into<String>) -> Self {
        let repo = repo.into();
        let path = path.into();
        let label = format!("git:{}:{}", repo.display(), path);
        Self { repo, path, label }
    }

    /// Run git inside the repository and return its stdout
    async fn git(&self, args: &[&str]) -> TrendResult<Vec<u8>> {
        debug!("Running git {}", args.join(" "));

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .args(args)
            .output()
            .await
            .map_err(|e| TrendError::git(format!("Failed to run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TrendError::git(format!(
                "git {} exited with {}: {}",
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl HistorySource for GitHistory {
    fn name(&self) -> &str {
        &self.label
    }

    #[instrument(skip(self), fields(path = %self.path))]
    async fn revisions(&self) -> TrendResult<Vec<String>> {
        let stdout = self.git(&["log", "--format=%H", "--", &self.path]).await?;
        let revisions = parse_revision_list(&String::from_utf8_lossy(&stdout));
        if revisions.is_empty() {
            return Err(TrendError::not_found(format!(
                "No commits touch {} in {}",
                self.path,
                self.repo.display()
            )));
        }
        debug!("Found {} revisions of {}", revisions.len(), self.path);
        Ok(revisions)
    }

    async fn fetch(&self, revision: &str) -> TrendResult<Vec<u8>> {
        let object = format!("{}:{}", revision, self.path);
        self.git(&["show", &object]).await
    }
}

/// Split `git log --format=%H` output into revision ids
fn parse_revision_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
