//! diffview CLI entry point.
//!
//! Classifies, highlights and summarizes diffs and prints the results as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use diffview::application::{
    DiffInput, DiffRenderer, RenderedDiff, build_changes_tree, tree_totals,
};
use diffview::domain::{ChangesTreeNode, DiffStats, FileStatus};
use diffview::infra::app_config::load_config;
use diffview::infra::diff::{files_from_patch, split_patch, stats_from_unified};
use diffview::infra::highlight::detect_language;

const PLAIN_LANGUAGE: &str = "text";

#[derive(Parser, Debug)]
#[command(name = "diffview")]
#[command(version)]
#[command(about = "Render-ready diffs, change stats and file trees", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Diff two versions of a file line by line
    Lines {
        /// Old version
        #[arg(long)]
        before: PathBuf,
        /// New version
        #[arg(long)]
        after: PathBuf,
        /// Highlight language (defaults to the extension of --after)
        #[arg(long)]
        language: Option<String>,
        /// Skip syntax highlighting
        #[arg(long)]
        plain: bool,
    },

    /// Render every file of a git patch
    Patch {
        /// Patch file (reads stdin when omitted)
        file: Option<PathBuf>,
        /// Skip syntax highlighting
        #[arg(long)]
        plain: bool,
    },

    /// Count added and removed lines of a unified diff
    Stats {
        /// Diff file (reads stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Roll the files of a git patch up into a directory tree
    Tree {
        /// Patch file (reads stdin when omitted)
        file: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct RenderedFile {
    file: String,
    status: FileStatus,
    #[serde(flatten)]
    rendered: RenderedDiff,
}

#[derive(Serialize)]
struct TreeOutput {
    totals: DiffStats,
    nodes: Vec<ChangesTreeNode>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Lines {
            before,
            after,
            language,
            plain,
        } => {
            let before_text = read_file(&before)?;
            let after_text = read_file(&after)?;
            let language = language.unwrap_or_else(|| language_for(&after.to_string_lossy()));
            let input = DiffInput::pair(before_text, after_text, language);
            let renderer = renderer()?;
            print_json(&render(&renderer, &input, plain).await)
        }
        Commands::Patch { file, plain } => {
            let text = read_input(file.as_deref())?;
            let files = files_from_patch(&text).context("Failed to parse patch")?;
            let sections = split_patch(&text).context("Failed to split patch")?;

            let renderer = renderer()?;
            let mut output = Vec::with_capacity(files.len());
            for (diff, (path, unified)) in files.iter().zip(sections) {
                let input = DiffInput::unified(unified, language_for(&path));
                output.push(RenderedFile {
                    file: diff.file.clone(),
                    status: diff.status(),
                    rendered: render(&renderer, &input, plain).await,
                });
            }
            print_json(&output)
        }
        Commands::Stats { file } => {
            let text = read_input(file.as_deref())?;
            print_json(&stats_from_unified(&text))
        }
        Commands::Tree { file } => {
            let text = read_input(file.as_deref())?;
            let files = files_from_patch(&text).context("Failed to parse patch")?;
            let nodes = build_changes_tree(&files);
            print_json(&TreeOutput {
                totals: tree_totals(&nodes),
                nodes,
            })
        }
    }
}

fn renderer() -> Result<DiffRenderer> {
    let config = load_config();
    DiffRenderer::from_config(&config)
        .with_context(|| format!("Failed to load highlight theme '{}'", config.theme))
}

async fn render(renderer: &DiffRenderer, input: &DiffInput, plain: bool) -> RenderedDiff {
    if plain {
        renderer.render_plain(input)
    } else {
        renderer.render(input).await
    }
}

fn language_for(path: &str) -> String {
    detect_language(path).unwrap_or_else(|| PLAIN_LANGUAGE.to_string())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Reads `path`, or stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        return read_file(path);
    }

    if std::io::stdin().is_terminal() {
        anyhow::bail!("No input: pass a file or pipe a diff on stdin");
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok(buffer)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
