//! Command runners
//!
//! The blocking library walk runs on a tokio blocking thread while a
//! Ctrl-C listener flips the walker's cancellation flag.

use crate::config::AppConfig;
use coverfix_library::{organize_by_album, CoverFixer, FolderOutcome, FolderReport, WalkSummary};
use coverfix_sync::LibraryMirror;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

/// Fix cover art under `root`
pub async fn fix(config: &AppConfig, root: PathBuf) -> anyhow::Result<WalkSummary> {
    let fixer = CoverFixer::new(config.fixer_config())?;
    let staging = config.staging_area();

    let cancel = fixer.cancel_flag();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let result = tokio::task::spawn_blocking(move || fixer.run_with_progress(&root, staging, print_report)).await;
    interrupt.abort();

    let summary = result??;
    print_summary(&summary);
    Ok(summary)
}

/// Mirror `source` onto `target`, then fix cover art on `target`
pub async fn sync(config: &AppConfig, source: &Path, target: &Path) -> anyhow::Result<()> {
    println!("Performing fast sync by comparing file sizes...");

    let mirror = LibraryMirror::new(config.mirror_options());
    tokio::select! {
        result = mirror.mirror(source, target) => result?,
        _ = tokio::signal::ctrl_c() => {
            println!("\nSync interrupted by user.");
            return Ok(());
        }
    }

    println!("\nFixing album art in the target directory...");
    let summary = fix(config, target.to_path_buf()).await?;
    if !summary.interrupted {
        println!("\nMusic sync and album art fix complete.");
    }
    Ok(())
}

/// Move loose audio files in `root` into per-album folders
pub async fn organize(root: PathBuf) -> anyhow::Result<()> {
    let summary = tokio::task::spawn_blocking(move || organize_by_album(&root)).await??;

    for moved in &summary.moved {
        println!("Moved {} -> {}", moved.from.display(), moved.to.display());
    }
    for error in &summary.failures {
        eprintln!("{}", error);
    }
    println!(
        "\n{} file(s) moved, {} without an album tag.",
        summary.moved.len(),
        summary.untagged.len()
    );
    Ok(())
}

/// One line per folder where art was found or fixed
pub fn report_line(report: &FolderReport) -> Option<String> {
    match &report.outcome {
        FolderOutcome::Extracted { source } => Some(format!(
            "Cover image extracted from {}, processed, and saved as {} in {}",
            source.file_name().unwrap_or_default().to_string_lossy(),
            report.cover.file_name().unwrap_or_default().to_string_lossy(),
            report.folder.display()
        )),
        FolderOutcome::Renormalized => Some(format!("Cover image normalized in {}", report.folder.display())),
        FolderOutcome::SkippedCanonical | FolderOutcome::NoArt | FolderOutcome::Failed(_) => None,
    }
}

fn print_report(report: &FolderReport) {
    for rejected in &report.rejected {
        eprintln!("Error extracting art from {}: {}", rejected.path.display(), rejected.error);
    }
    if let FolderOutcome::Failed(error) = &report.outcome {
        eprintln!("Error processing '{}': {}", report.folder.display(), error);
    }
    if let Some(line) = report_line(report) {
        println!("{}", line);
    }
}

/// Final status line(s) for a walk
pub fn summary_lines(summary: &WalkSummary) -> Vec<String> {
    let mut lines = Vec::new();
    if summary.interrupted {
        lines.push("\nProcessing interrupted by user.".to_string());
    } else if summary.visited > 0 {
        lines.push(format!("\n{} folder(s) processed.", summary.visited));
    }
    lines
}

fn print_summary(summary: &WalkSummary) {
    for line in summary_lines(summary) {
        println!("{}", line);
    }
    if let Some(error) = &summary.cleanup_error {
        eprintln!("Error clearing temporary directory: {}", error);
    }
    tracing::info!(
        "extracted={} renormalized={} skipped={} no_art={} failed={}",
        summary.extracted,
        summary.renormalized,
        summary.skipped_canonical,
        summary.no_art,
        summary.failures.len()
    );
}
