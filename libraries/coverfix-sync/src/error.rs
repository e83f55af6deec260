use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while mirroring a library
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rsync failed with {}", exit_description(.code))]
    Failed { code: Option<i32> },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
