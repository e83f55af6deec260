//! rsync wrapper

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Fixed rsync options: recursive, keep times, verbose progress, size-only
/// comparison, delete extraneous files, write in place, ignore ownership
/// and permissions
const RSYNC_OPTIONS: &[&str] = &[
    "-rtvvhP",
    "--size-only",
    "--delete",
    "--delete-excluded",
    "--inplace",
    "--modify-window=2",
    "--no-g",
    "--no-o",
    "--no-p",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorOptions {
    pub rsync_path: PathBuf,
    /// Names protected from deletion on the target
    pub protected: Vec<String>,
    /// Names never copied (and deleted from the target)
    pub excluded: Vec<String>,
    /// Additional rsync filter rules, e.g. `"- *.m3u"`
    pub extra_filters: Vec<String>,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            rsync_path: PathBuf::from("rsync"),
            protected: vec!["cover.jpg".to_string()],
            excluded: vec![".DS_Store".to_string()],
            extra_filters: Vec::new(),
        }
    }
}

impl MirrorOptions {
    /// Add a protect rule for `name` unless one exists
    pub fn protect(&mut self, name: &str) {
        if !self.protected.iter().any(|existing| existing == name) {
            self.protected.push(name.to_string());
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LibraryMirror {
    options: MirrorOptions,
}

impl LibraryMirror {
    pub fn new(options: MirrorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MirrorOptions {
        &self.options
    }

    /// Filter rules in the order they are passed to rsync
    pub fn filter_rules(&self) -> Vec<String> {
        let protect = self.options.protected.iter().map(|name| format!("P {}", name));
        let exclude = self.options.excluded.iter().map(|name| format!("- {}", name));
        protect
            .chain(exclude)
            .chain(self.options.extra_filters.iter().cloned())
            .collect()
    }

    /// Full rsync argument list; the source gets a trailing slash so its
    /// contents, not the directory itself, land in `target`
    pub fn args(&self, source: &Path, target: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = RSYNC_OPTIONS.iter().map(OsString::from).collect();
        args.extend(self.filter_rules().into_iter().map(|rule| OsString::from(format!("--filter={}", rule))));

        let mut source_arg = source.as_os_str().to_os_string();
        if !source_arg.to_string_lossy().ends_with('/') {
            source_arg.push("/");
        }
        args.push(source_arg);
        args.push(target.as_os_str().to_os_string());
        args
    }

    /// Run rsync to completion, streaming its output to the terminal
    pub async fn mirror(&self, source: &Path, target: &Path) -> Result<()> {
        if !source.is_dir() {
            return Err(SyncError::SourceNotFound(source.to_path_buf()));
        }

        tracing::info!("Mirroring {} to {}", source.display(), target.display());

        let status = Command::new(&self.options.rsync_path)
            .args(self.args(source, target))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| SyncError::Spawn {
                program: self.options.rsync_path.clone(),
                source,
            })?;

        if !status.success() {
            return Err(SyncError::Failed { code: status.code() });
        }

        tracing::info!("Mirror complete");
        Ok(())
    }
}
