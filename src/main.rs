//! resultsift - filter a saved search-result listing from the command line.
//!
//! The filters are typed into the listing's header region exactly as a user
//! would type them in an editor, so the output is the view the editor would show.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use resultsift::{EngineConfig, SearchResultDocument, TextBuffer, TextEdit};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("resultsift")
        .version(resultsift::VERSION)
        .about("Filter a search-result listing without losing the hidden lines")
        .long_about(
            "resultsift reads a search-result listing (`<path>:` headers followed by \
             indented `<line>: <text>` results), applies include/exclude filters the \
             way they would be typed above the first header, and prints the filtered view.",
        )
        .arg(
            Arg::new("file")
                .help("Path to the saved search-result listing")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("filter")
                .short('f')
                .long("filter")
                .help("Filter line such as +text, -text, file+path or file-path")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("hidden")
                .long("hidden")
                .help("List the hidden source lines on stderr")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let file_path = PathBuf::from(
        matches
            .get_one::<String>("file")
            .context("file argument is required")?,
    );

    if !file_path.exists() {
        anyhow::bail!("File does not exist: {}", file_path.display());
    }

    if !file_path.is_file() {
        anyhow::bail!("Path is not a regular file: {}", file_path.display());
    }

    let text = tokio::fs::read_to_string(&file_path)
        .await
        .with_context(|| format!("Failed to read {}", file_path.display()))?;

    let mut doc = SearchResultDocument::open_with_config(text, load_config()?);

    let filters: Vec<&String> = matches
        .get_many::<String>("filter")
        .map(|values| values.collect())
        .unwrap_or_default();
    for (typed, filter) in filters.into_iter().enumerate() {
        let buffer = doc.buffer();
        let line_end = buffer.line_start(typed).unwrap_or(0)
            + buffer.line(typed).map_or(0, str::len);
        doc.apply_edit(TextEdit::insert(line_end, format!("\n{}", filter)))
            .with_context(|| format!("Failed to apply filter {:?}", filter))?;
    }

    println!("{}", doc.text());

    if matches.get_flag("hidden") {
        let hidden = doc.session().hidden_lines();
        eprintln!("{} hidden line(s)", hidden.len());
        for (line, text) in hidden {
            eprintln!("{:>6}: {}", line + 1, text);
        }
    }

    Ok(())
}

#[cfg(feature = "config")]
fn load_config() -> Result<EngineConfig> {
    EngineConfig::load().context("Failed to load configuration")
}

#[cfg(not(feature = "config"))]
fn load_config() -> Result<EngineConfig> {
    Ok(EngineConfig::default())
}
