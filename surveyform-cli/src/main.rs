mod log;

use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use serde_json::Value;
use tracing::{debug, trace};

use surveyform::geo::{GeoDirectory, StaticGeoDirectory};
use surveyform::io::{
    DocumentFormat, OutputDestination, OutputOptions, emit, emit_text, parse_document_str,
};
use surveyform::presentation::{PreviewOptions, render_session};
use surveyform::{
    EngineOptions, FormSession, Payload, SubmissionError, descriptor_schema, load_form, normalize,
};

use crate::log::LogLevel;

#[derive(Debug, Parser)]
#[command(
    name = "surveyform",
    version,
    about = "Normalize, preview and submit survey forms"
)]
struct Cli {
    /// Log verbosity. Falls back to RUST_LOG when unset
    #[arg(long = "log-level", value_enum, global = true)]
    log_level: Option<LogLevel>,

    /// Quiet period before a typed answer is committed
    #[arg(long = "debounce-ms", value_name = "MS", default_value_t = 300, global = true)]
    debounce_ms: u64,

    /// Regex marking geolocation fields by id or label
    #[arg(long = "geo-pattern", value_name = "REGEX", global = true)]
    geo_pattern: Option<String>,

    /// Skip per-field constraint checks (patterns, ranges, options)
    #[arg(long = "no-constraints", global = true)]
    no_constraints: bool,

    /// Output destinations ("-" writes to stdout). Accepts multiple values per flag use.
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append, global = true)]
    outputs: Vec<String>,

    /// Emit compact JSON/TOML rather than pretty formatting
    #[arg(long = "no-pretty", global = true)]
    no_pretty: bool,

    /// Overwrite output files even if they already exist
    #[arg(short = 'f', long = "force", short_alias = 'y', alias = "yes", global = true)]
    force: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the flattened field descriptors of a schema
    Normalize {
        /// Schema spec: file path, inline payload, or "-" for stdin
        schema: String,
    },
    /// Render a plain-text preview of a form
    Preview {
        /// Schema spec: file path, inline payload, or "-" for stdin
        schema: String,
        /// Answers to show in the preview
        #[arg(short = 'a', long = "answers", value_name = "SPEC")]
        answers: Option<String>,
        /// Wrap width in columns
        #[arg(long = "width", default_value_t = 72)]
        width: usize,
        /// Also list fields hidden by their conditions
        #[arg(long = "show-hidden")]
        show_hidden: bool,
    },
    /// Validate answers and print the submission envelope
    Submit {
        /// Schema spec: file path, inline payload, or "-" for stdin
        schema: String,
        #[arg(short = 'a', long = "answers", value_name = "SPEC")]
        answers: String,
        #[arg(long = "form-id", value_name = "ID")]
        form_id: String,
        #[arg(long = "survey-id", value_name = "ID")]
        survey_id: String,
        /// Mark the submission as captured offline
        #[arg(long = "offline")]
        offline: bool,
    },
    /// Print the JSON Schema of the flat field descriptor list
    DescriptorSchema,
    /// List the next level of a province/city/commune/quartier table
    Geo {
        /// Table spec: file path, inline payload, or "-" for stdin
        table: String,
        province: Option<String>,
        city: Option<String>,
        commune: Option<String>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Normalize { .. } => "normalize",
            Command::Preview { .. } => "preview",
            Command::Submit { .. } => "submit",
            Command::DescriptorSchema => "descriptor-schema",
            Command::Geo { .. } => "geo",
        }
    }
}

#[derive(Debug)]
enum InputSource {
    File(PathBuf),
    Stdin,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    log::init(cli.log_level);
    trace!(subcommand = cli.command.name(), "starting");

    let mut diagnostics = DiagnosticCollector::default();
    let (output, output_paths) = build_output_options(&cli, &mut diagnostics);
    ensure_output_paths_available(&output_paths, cli.force, &mut diagnostics);
    let engine = engine_options(&cli, &mut diagnostics);
    diagnostics.into_result()?;

    match &cli.command {
        Command::Normalize { schema } => {
            let schema = load_value(schema, "schema")?;
            emit(&normalize(&schema), &output).map_err(Report::msg)?;
        }
        Command::Preview {
            schema,
            answers,
            width,
            show_hidden,
        } => {
            let session = open_session(engine, schema, answers.as_deref())?;
            let options = PreviewOptions::default()
                .with_width(*width)
                .with_hidden(*show_hidden);
            let preview = render_session(&session, &options);
            emit_text(preview.trim_end(), &output).map_err(Report::msg)?;
        }
        Command::Submit {
            schema,
            answers,
            form_id,
            survey_id,
            offline,
        } => {
            let mut session = open_session(engine, schema, Some(answers.as_str()))?;
            let submission = session
                .submit(form_id.as_str(), survey_id.as_str(), !offline, Utc::now())
                .map_err(rejection)?;
            emit(&submission, &output).map_err(Report::msg)?;
        }
        Command::DescriptorSchema => {
            emit(&descriptor_schema(), &output).map_err(Report::msg)?;
        }
        Command::Geo {
            table,
            province,
            city,
            commune,
        } => {
            let value = load_value(table, "geo table")?;
            let directory: StaticGeoDirectory = serde_json::from_value(value)
                .wrap_err("geo table must be shaped {province: {city: {commune: [quartier]}}}")?;
            let entries = list_level(
                &directory,
                province.as_deref(),
                city.as_deref(),
                commune.as_deref(),
            );
            emit_text(&entries.join("\n"), &output).map_err(Report::msg)?;
        }
    }

    Ok(())
}

fn engine_options(cli: &Cli, diagnostics: &mut DiagnosticCollector) -> EngineOptions {
    let options = EngineOptions::default()
        .with_debounce(Duration::from_millis(cli.debounce_ms))
        .with_constraint_validation(!cli.no_constraints);
    match cli.geo_pattern.as_deref() {
        Some(pattern) => match options.clone().with_geolocation_pattern(pattern) {
            Ok(options) => options,
            Err(err) => {
                diagnostics.push_input("geo-pattern", format!("{err:#}"));
                options
            }
        },
        None => options,
    }
}

fn open_session(
    options: EngineOptions,
    schema: &str,
    answers: Option<&str>,
) -> Result<FormSession> {
    let schema = load_value(schema, "schema")?;
    let mut session = FormSession::new(options);
    session.open_definition(load_form(&schema));
    if session.fields().is_empty() {
        return Err(eyre!("schema contains no fields"));
    }

    if let Some(spec) = answers {
        let value = load_value(spec, "answers")?;
        let payload: Payload = serde_json::from_value(value)
            .wrap_err("answers must be an object of field id to string, list or rank map")?;
        debug!(count = payload.len(), "loaded answers");
        for (id, answer) in payload {
            session.set_answer(&id, answer);
        }
    }
    Ok(session)
}

fn rejection(err: SubmissionError) -> Report {
    match &err {
        SubmissionError::GeolocationMissing { field_id } => {
            eyre!("submission blocked: geolocation missing for {field_id}")
        }
        SubmissionError::Invalid(_) => eyre!("submission rejected: {err}"),
    }
}

fn list_level(
    directory: &impl GeoDirectory,
    province: Option<&str>,
    city: Option<&str>,
    commune: Option<&str>,
) -> Vec<String> {
    match (province, city, commune) {
        (None, _, _) => directory.provinces(),
        (Some(province), None, _) => directory
            .cities_of(province)
            .into_iter()
            .map(|city| city.name)
            .collect(),
        (Some(province), Some(city), None) => directory.communes_of(province, city),
        (Some(province), Some(city), Some(commune)) => {
            directory.quartiers_of(province, city, commune)
        }
    }
}

fn load_value(spec: &str, label: &str) -> Result<Value> {
    if spec == "-" {
        let contents = read_from_source(&InputSource::Stdin)?;
        return parse_contents(&contents, DocumentFormat::Json, label);
    }

    let path = PathBuf::from(spec);
    let format = DocumentFormat::from_path(&path);
    match read_from_source(&InputSource::File(path.clone())) {
        Ok(contents) => parse_contents(&contents, format, label),
        Err(err) => {
            if is_not_found(&err) {
                let inline_label = format!("inline {label}");
                return parse_contents(spec, DocumentFormat::Json, &inline_label);
            }
            Err(err.wrap_err(format!("failed to load {label} from {}", path.display())))
        }
    }
}

fn read_from_source(source: &InputSource) -> Result<String> {
    match source {
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .wrap_err("failed to read from stdin")?;
            Ok(buffer)
        }
        InputSource::File(path) => fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read file {}", path.display())),
    }
}

fn is_not_found(err: &Report) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|io_err| io_err.kind() == io::ErrorKind::NotFound)
}

fn parse_contents(contents: &str, format: DocumentFormat, label: &str) -> Result<Value> {
    match parse_document_str(contents, format) {
        Ok(value) => Ok(value),
        Err(primary) => {
            for candidate in DocumentFormat::available_formats() {
                if candidate == format {
                    continue;
                }
                if let Ok(value) = parse_document_str(contents, candidate) {
                    return Ok(value);
                }
            }
            Err(eyre!(
                "failed to parse {label}: tried {} (first error: {primary:#})",
                format_list()
            ))
        }
    }
}

fn format_list() -> String {
    let items: Vec<String> = DocumentFormat::available_formats()
        .into_iter()
        .map(|fmt| fmt.to_string())
        .collect();
    items.join(", ")
}

#[derive(Default)]
struct DiagnosticCollector {
    messages: Vec<String>,
}

impl DiagnosticCollector {
    fn push_input(&mut self, label: &str, message: impl Into<String>) {
        self.messages
            .push(format!("input ({label}): {}", message.into()));
    }

    fn push_output(&mut self, message: impl Into<String>) {
        self.messages.push(format!("output: {}", message.into()));
    }

    fn into_result(self) -> Result<()> {
        if self.messages.is_empty() {
            return Ok(());
        }
        let mut body = String::from("encountered input/output issues:\n");
        for (idx, msg) in self.messages.iter().enumerate() {
            let _ = writeln!(body, "  {}. {}", idx + 1, msg);
        }
        Err(eyre!(body))
    }
}

fn build_output_options(
    cli: &Cli,
    diagnostics: &mut DiagnosticCollector,
) -> (OutputOptions, Vec<PathBuf>) {
    let mut destinations = Vec::new();
    for raw in &cli.outputs {
        if raw.trim().is_empty() {
            diagnostics.push_output("output destination cannot be empty");
            continue;
        }
        destinations.push(OutputDestination::parse(raw));
    }
    if destinations.is_empty() {
        destinations.push(OutputDestination::Stdout);
    }

    let file_paths: Vec<PathBuf> = destinations
        .iter()
        .filter_map(|dest| dest.path().map(Path::to_path_buf))
        .collect();

    let format = infer_format_from_files(&file_paths, diagnostics);
    let options = OutputOptions::new(format)
        .with_pretty(!cli.no_pretty)
        .with_destinations(destinations);
    (options, file_paths)
}

fn infer_format_from_files(
    file_paths: &[PathBuf],
    diagnostics: &mut DiagnosticCollector,
) -> DocumentFormat {
    let mut detected: Option<DocumentFormat> = None;
    for path in file_paths {
        let format = DocumentFormat::from_path(path);
        match detected {
            Some(existing) if existing != format => diagnostics.push_output(format!(
                "output file {} uses {format} but other destinations use {existing}; align extensions",
                path.display()
            )),
            Some(_) => {}
            None => detected = Some(format),
        }
    }
    detected.unwrap_or_default()
}

fn ensure_output_paths_available(
    paths: &[PathBuf],
    force: bool,
    diagnostics: &mut DiagnosticCollector,
) {
    if force {
        return;
    }
    for path in paths {
        if path.exists() {
            diagnostics.push_output(format!(
                "file {} already exists (pass --force to overwrite)",
                path.display()
            ));
        }
    }
}
