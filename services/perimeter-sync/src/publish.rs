//! Git publishing of the written document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::config::PublishConfig;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to run git {command}: {source}")]
    Spawn {
        command: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("git add failed: {0}")]
    Stage(String),

    #[error("git commit failed: {0}")]
    Commit(String),

    #[error("git push failed: {0}")]
    Push(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Committed and pushed.
    Published { message: String },
    /// The staged file matched HEAD; nothing was committed.
    Unchanged,
}

/// Publishes a written file somewhere outside the process.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, path: &Path) -> Result<PublishOutcome, PublishError>;
}

/// Commit message for a file published at `at`.
pub fn commit_message(file_name: &str, at: NaiveDateTime) -> String {
    format!("Add {} - {}", file_name, at.format("%Y-%m-%d %H:%M:%S"))
}

/// Stages, commits and pushes one file in a local working tree.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_dir: PathBuf,
    remote: Option<String>,
    branch: Option<String>,
}

struct GitOutput {
    success: bool,
    stderr: String,
}

impl GitPublisher {
    pub fn new(repo_dir: PathBuf, config: &PublishConfig) -> Self {
        Self {
            repo_dir,
            remote: config.remote.clone(),
            branch: config.branch.clone(),
        }
    }

    async fn git(&self, command: &'static str, args: &[&str]) -> Result<GitOutput, PublishError> {
        debug!(command, ?args, "Running git");
        let output = Command::new("git")
            .current_dir(&self.repo_dir)
            .arg(command)
            .args(args)
            .output()
            .await
            .map_err(|source| PublishError::Spawn { command, source })?;

        Ok(GitOutput {
            success: output.status.success(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    /// Path of `path` relative to the working tree, when it lies inside it.
    fn pathspec(&self, path: &Path) -> String {
        path.strip_prefix(&self.repo_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait]
impl Publisher for GitPublisher {
    #[instrument(skip(self), fields(repo = %self.repo_dir.display()))]
    async fn publish(&self, path: &Path) -> Result<PublishOutcome, PublishError> {
        let pathspec = self.pathspec(path);

        let add = self.git("add", &[pathspec.as_str()]).await?;
        if !add.success {
            return Err(PublishError::Stage(add.stderr));
        }

        let diff = self
            .git("diff", &["--cached", "--quiet", "--", pathspec.as_str()])
            .await?;
        if diff.success {
            info!(file = %pathspec, "No changes to publish");
            return Ok(PublishOutcome::Unchanged);
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| pathspec.clone());
        let message = commit_message(&file_name, Local::now().naive_local());

        let commit = self
            .git("commit", &["-m", message.as_str(), "--", pathspec.as_str()])
            .await?;
        if !commit.success {
            return Err(PublishError::Commit(commit.stderr));
        }

        let mut push_args: Vec<&str> = Vec::new();
        if let Some(remote) = &self.remote {
            push_args.push(remote);
            if let Some(branch) = &self.branch {
                push_args.push(branch);
            }
        }
        let push = self.git("push", &push_args).await?;
        if !push.success {
            return Err(PublishError::Push(push.stderr));
        }

        info!(file = %pathspec, message = %message, "Published");
        Ok(PublishOutcome::Published { message })
    }
}
