//! # Tagbench CLI
//!
//! Batch front end over one schema and a set of documents:
//!
//! - `check`: list incomplete tags, exit status 1 if any
//! - `export`: write each document's annotations as a JSON snapshot
//! - `stats`: tag counts per document and type
//!
//! Documents ending in `.json` are read as saved snapshots; anything else is
//! read as plain text with no tags.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tagbench_schema::SchemaFile;
use tagbench_session::{DocumentSource, SessionConfig, SessionManager, SnapshotFile, TextDocument};
use tagbench_store::{check_completeness, missing_fields};
use tracing::{debug, info};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn session_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("schema")
            .long("schema")
            .short('s')
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Schema file (.json, .yaml or .yml)"),
    )
    .arg(
        Arg::new("doc")
            .long("doc")
            .short('d')
            .required(true)
            .action(ArgAction::Append)
            .value_parser(value_parser!(PathBuf))
            .help("Document to open; repeat for several"),
    )
    .arg(
        Arg::new("config")
            .long("config")
            .short('c')
            .value_parser(value_parser!(PathBuf))
            .help("Session configuration (TOML)"),
    )
}

/// Argument definitions
#[must_use]
pub fn command() -> Command {
    Command::new("tagbench")
        .version(VERSION)
        .about("Schema-driven annotation consistency tools")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging"),
        )
        .subcommand(session_args(
            Command::new("check").about("Report tags missing required attributes or arguments"),
        ))
        .subcommand(
            session_args(Command::new("export").about("Write each document as a JSON snapshot"))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Output directory (default: next to each document)"),
                ),
        )
        .subcommand(
            session_args(Command::new("stats").about("Count tags per document and type")).arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Output as JSON"),
            ),
        )
}

/// Run the selected subcommand, writing its report to `out`
///
/// Returns the process exit status.
///
/// # Errors
/// Returns an error if the schema, configuration or a document cannot be
/// loaded, or an output cannot be written
pub fn run(matches: &ArgMatches, out: &mut dyn Write) -> Result<i32> {
    match matches.subcommand() {
        Some(("check", args)) => check(&open_session(args)?, out),
        Some(("export", args)) => {
            let mut session = open_session(args)?;
            export(&mut session, args.get_one::<PathBuf>("out").map(PathBuf::as_path), out)
        }
        Some(("stats", args)) => stats(&open_session(args)?, args.get_flag("json"), out),
        _ => Ok(2),
    }
}

fn open_session(args: &ArgMatches) -> Result<SessionManager> {
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };

    let mut session = SessionManager::new(config);
    let schema_path = args
        .get_one::<PathBuf>("schema")
        .context("--schema is required")?;
    session
        .load_schema(Arc::new(SchemaFile::new(schema_path)))
        .with_context(|| format!("loading schema {}", schema_path.display()))?;

    for path in args.get_many::<PathBuf>("doc").into_iter().flatten() {
        let source = document_source(path)?;
        session
            .open_document(source.as_ref())
            .with_context(|| format!("opening {}", path.display()))?;
    }
    info!(documents = session.documents().len(), "Session ready");
    Ok(session)
}

fn document_source(path: &Path) -> Result<Box<dyn DocumentSource>> {
    let is_snapshot = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_snapshot {
        return Ok(Box::new(SnapshotFile::new(path)));
    }
    let text = TextDocument::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Box::new(text))
}

fn check(session: &SessionManager, out: &mut dyn Write) -> Result<i32> {
    let mut incomplete = 0usize;
    for doc in session.documents() {
        for tag in check_completeness(doc.store()) {
            let fields: Vec<String> = missing_fields(tag).iter().map(ToString::to_string).collect();
            writeln!(
                out,
                "{}: {} ({}) missing {}",
                doc.name(),
                tag.id(),
                tag.tag_type(),
                fields.join(", ")
            )?;
            incomplete += 1;
        }
    }
    writeln!(
        out,
        "{} document(s), {incomplete} incomplete tag(s)",
        session.documents().len()
    )?;
    Ok(i32::from(incomplete > 0))
}

fn export(session: &mut SessionManager, dir: Option<&Path>, out: &mut dyn Write) -> Result<i32> {
    for index in 0..session.documents().len() {
        let suggested = session.suggested_save_path(index)?;
        let path = match (dir, suggested.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => suggested.clone(),
        };
        debug!(index, path = %path.display(), "Exporting document");
        let saved = session.save_document(index, &path)?;
        writeln!(out, "{}", saved.display())?;
    }
    Ok(0)
}

/// Tag counts for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    /// Document base name
    pub document: String,
    /// Live tags
    pub tags: usize,
    /// Live tags per type name
    pub by_type: BTreeMap<String, usize>,
    /// Tags failing the completeness check
    pub incomplete: usize,
}

fn stats(session: &SessionManager, json: bool, out: &mut dyn Write) -> Result<i32> {
    let mut report = Vec::with_capacity(session.documents().len());
    for doc in session.documents() {
        let snapshot = doc.store().export()?;
        report.push(DocumentStats {
            document: doc.name(),
            tags: snapshot.tags.len(),
            by_type: snapshot
                .counts_by_type()
                .into_iter()
                .map(|(name, count)| (name.to_string(), count))
                .collect(),
            incomplete: check_completeness(doc.store()).len(),
        });
    }

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(0);
    }
    for entry in &report {
        writeln!(
            out,
            "{}: {} tag(s), {} incomplete",
            entry.document, entry.tags, entry.incomplete
        )?;
        for (name, count) in &entry.by_type {
            writeln!(out, "  {name}: {count}")?;
        }
    }
    Ok(0)
}
