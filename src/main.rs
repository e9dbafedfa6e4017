//! CLI entry point for the ziplens archive browser.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ziplens::{ArchiveBrowser, ArchiveWatcher, Cli, Command, NodeKind};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;

    match cli.command {
        Command::Roots { dir } => {
            let workspace = workspace_or_cwd(dir)?;
            let browser = ArchiveBrowser::new(workspace, settings);
            for node in browser.roots() {
                println!("{}\t{}", node.name, browser.location_of(&node.archive));
            }
        }
        Command::Ls { archive, path } => {
            let browser = browser_for(&archive, settings)?;
            let children = browser
                .children(&archive, path.as_deref())
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            for node in children {
                match node.kind {
                    NodeKind::Directory => println!("{}/", node.name),
                    _ => println!("{}", node.name),
                }
            }
        }
        Command::Cat { archive, path } => {
            let browser = browser_for(&archive, settings)?;
            match browser.preview(&archive, &path).await {
                Ok(text) => print!("{text}"),
                Err(err) => bail!(err.user_message()),
            }
        }
        Command::Extract {
            archive,
            path,
            output,
        } => {
            let browser = browser_for(&archive, settings)?;
            let bytes = browser
                .read_bytes(&archive, &path)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            match output {
                Some(out) => {
                    tokio::fs::write(&out, &bytes)
                        .await
                        .with_context(|| format!("Failed to write {}", out.display()))?;
                    info!(bytes = bytes.len(), output = %out.display(), "entry extracted");
                }
                None => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&bytes).await?;
                }
            }
        }
        Command::Watch { dir } => {
            let workspace = workspace_or_cwd(dir)?;
            let browser = ArchiveBrowser::new(workspace.clone(), settings);
            run_watch(&browser, &workspace).await?;
        }
    }

    Ok(())
}

/// A browser rooted at the archive's parent directory, for the single-shot
/// subcommands.
fn browser_for(archive: &Path, settings: ziplens::Settings) -> Result<ArchiveBrowser> {
    let workspace = archive
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .map_or_else(std::env::current_dir, Ok)?;
    Ok(ArchiveBrowser::new(workspace, settings))
}

fn workspace_or_cwd(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().context("cannot determine working directory"),
    }
}

/// Poll the watcher and feed debounced events through the browser's
/// change-notification boundary until interrupted.
async fn run_watch(browser: &ArchiveBrowser, workspace: &Path) -> Result<()> {
    let mut watcher = ArchiveWatcher::new()?;
    watcher.watch(workspace)?;

    let initial = browser.roots();
    info!(
        workspace = %workspace.display(),
        archives = initial.len(),
        "watching for archive changes"
    );

    loop {
        for event in watcher.poll_events() {
            browser.handle_event(&event);
        }
        if browser.rescan_needed() {
            let roots = browser.roots();
            info!(archives = roots.len(), "rescanned workspace archives");
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}
