use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use super::DocumentFormat;

/// Where normalized fields, submissions and previews are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    pub fn file(path: impl AsRef<Path>) -> Self {
        OutputDestination::File(path.as_ref().to_path_buf())
    }

    /// `-` is stdout, anything else a file path.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "-" => OutputDestination::Stdout,
            path => OutputDestination::file(path),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            OutputDestination::File(path) => Some(path),
            OutputDestination::Stdout => None,
        }
    }

    /// Writes `text` followed by a newline. Files are replaced.
    fn write_line(&self, text: &str) -> Result<()> {
        match self {
            OutputDestination::Stdout => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{text}")
                    .and_then(|_| stdout.flush())
                    .context("failed to write to stdout")
            }
            OutputDestination::File(path) => fs::write(path, format!("{text}\n"))
                .with_context(|| format!("failed to write to file {}", path.display())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: DocumentFormat,
    /// Ignored by YAML, which has a single layout.
    pub pretty: bool,
    pub destinations: Vec<OutputDestination>,
}

impl OutputOptions {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: true,
            destinations: vec![OutputDestination::Stdout],
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_destinations(mut self, destinations: Vec<OutputDestination>) -> Self {
        self.destinations = destinations;
        self
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new(DocumentFormat::Json)
    }
}

/// Renders a serializable result in `format`.
pub fn render_document<T: Serialize>(
    value: &T,
    format: DocumentFormat,
    pretty: bool,
) -> Result<String> {
    let rendered = match format {
        DocumentFormat::Json if pretty => serde_json::to_string_pretty(value)?,
        DocumentFormat::Json => serde_json::to_string(value)?,
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => serde_yaml::to_string(value)?.trim_end().to_string(),
        #[cfg(feature = "toml")]
        DocumentFormat::Toml if pretty => toml::to_string_pretty(value)?.trim_end().to_string(),
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => toml::to_string(value)?.trim_end().to_string(),
    };
    Ok(rendered)
}

pub fn emit<T: Serialize>(value: &T, options: &OutputOptions) -> Result<()> {
    if options.destinations.is_empty() {
        return Ok(());
    }
    let rendered = render_document(value, options.format, options.pretty)
        .with_context(|| format!("failed to serialize {}", options.format))?;
    emit_text(&rendered, options)
}

/// Text that is already rendered, such as a form preview.
pub fn emit_text(text: &str, options: &OutputOptions) -> Result<()> {
    options
        .destinations
        .iter()
        .try_for_each(|destination| destination.write_line(text))
}
