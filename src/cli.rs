//! CLI: check | format | describe scene documents
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;

use struct_mapping::scene::{self, Elements};
use struct_mapping::{describe, mapping, MapError};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// map scene documents onto their registered struct model and back
#[derive(Parser, Debug)]
#[command(name = "struct-mapping", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// map every input and report which ones fail (exits non-zero on failure)
    Check(CheckOut),
    /// map a document and serialize it back in registry order
    Format(FormatOut),
    /// print a JSON-schema-ish description of the scene model
    Describe(DescribeOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required_unless_present = "sample")]
    input: Vec<String>,

    /// use the embedded sample document as an input
    #[arg(long, default_value_t = false)]
    sample: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// print a JSON report instead of colored lines
    #[arg(long)]
    json: bool,
}

#[derive(clap::Parser, Debug)]
struct FormatOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// spaces per nesting level
    #[arg(long, default_value_t = 4)]
    indent: usize,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct DescribeOut {
    /// include the embedded sample as an `examples` entry
    #[arg(long)]
    with_sample: bool,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Document {
    File(PathBuf),
    Sample,
}

#[derive(Debug, Clone, Serialize)]
struct CheckReport {
    source: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    shapes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn documents(&self) -> Result<Vec<Document>> {
        let mut documents = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?
            .into_iter()
            .map(Document::File)
            .collect::<Vec<_>>();
        if self.sample {
            documents.push(Document::Sample);
        }
        Ok(documents)
    }
}

impl Document {
    fn name(&self) -> String {
        match self {
            Document::File(path) => path.to_string_lossy().to_string(),
            Document::Sample => scene::Source::Embedded.to_string(),
        }
    }

    fn load(&self) -> Result<Elements, MapError> {
        match self {
            Document::File(path) => {
                let source = std::fs::read_to_string(path)?;
                mapping::from_json_str(&source)
            }
            Document::Sample => scene::sample(),
        }
    }
}

impl CheckReport {
    fn new(document: &Document, result: Result<Elements, MapError>) -> Self {
        let source = document.name();
        match result {
            Ok(elements) => Self { source, ok: true, shapes: Some(elements.len()), field: None, error: None },
            Err(error) => Self {
                source,
                ok: false,
                shapes: None,
                field: error.field().map(str::to_string),
                error: Some(error.to_string()),
            },
        }
    }

    fn render(&self) -> String {
        match (&self.error, self.shapes) {
            (Some(error), _) => format!("{} {}: {}", "FAILED".red().bold(), self.source, error),
            (None, Some(shapes)) => format!("{} {} ({shapes} shapes)", "ok".green().bold(), self.source),
            (None, None) => format!("{} {}", "ok".green().bold(), self.source),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// `Ok(false)` when the command ran but some input failed to map.
    pub fn run(&self) -> Result<bool> {
        match &self.cmd {
            Command::Check(target) => {
                let documents = target.input_settings.documents()?;
                let reports = check_documents(&documents);
                let failures = reports.iter().filter(|r| !r.ok).count();
                tracing::info!(documents = reports.len(), failures, "check finished");
                if target.json {
                    println!("{}", serde_json::to_string_pretty(&reports)?);
                } else {
                    for report in &reports {
                        println!("{}", report.render());
                    }
                }
                Ok(failures == 0)
            }
            Command::Format(target) => {
                let documents = target.input_settings.documents()?;
                let [document] = documents.as_slice() else {
                    bail!("format expects exactly one input, got {}", documents.len());
                };
                let elements = document
                    .load()
                    .with_context(|| format!("failed to map {}", document.name()))?;
                let formatted = mapping::map_struct_to_json_pretty(&elements, target.indent)?;
                write_output(target.out.as_deref(), &formatted)?;
                Ok(true)
            }
            Command::Describe(target) => {
                let schema = if target.with_sample {
                    describe::describe_with_sample(&scene::sample()?)?
                } else {
                    describe::describe::<Elements>()?
                };
                write_output(target.out.as_deref(), &serde_json::to_string_pretty(&schema)?)?;
                Ok(true)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn check_documents(documents: &[Document]) -> Vec<CheckReport> {
    documents
        .par_iter()
        .map(|document| {
            let result = document.load();
            if let Err(error) = &result {
                tracing::debug!(source = %document.name(), %error, "document failed to map");
            }
            CheckReport::new(document, result)
        })
        .collect()
}

fn write_output(out: Option<&Path>, contents: &str) -> Result<()> {
    let Some(out) = out else {
        println!("{contents}");
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // an explicit glob that matched nothing is a usage error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
