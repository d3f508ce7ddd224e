//! Command-line interface for mgql.
//!
//! # Usage
//!
//! ```bash
//! # Compile a request to query text
//! mgql compile --schema schema.json --model post find-record --id 1
//! mgql compile --schema schema.json --model comment find-many --ids 1,2,3
//! mgql compile --schema schema.json --model post query --query '{"status":"draft"}'
//! mgql compile --schema schema.json --model post create-record --record post.json
//!
//! # Normalize a server response
//! mgql normalize --schema schema.json --model post --request find-all --response response.json
//!
//! # Check schema files for relationships to unknown models
//! mgql check schema.json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use mgql_core::{Config, KeyCase, ModelRegistry, RequestKind, SchemaRegistry};
use mgql_planner::Request;
use mgql_serializer::{ensure_no_errors, Normalizer, RecordSnapshot};
use miette::{miette, IntoDiagnostic, WrapErr};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "mgql")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CaseStyle {
    /// `firstName`
    #[default]
    Camel,
    /// `first_name`
    Snake,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RequestArg {
    FindRecord,
    FindMany,
    FindAll,
    Query,
    QueryRecord,
    CreateRecord,
    UpdateRecord,
    DeleteRecord,
}

impl RequestArg {
    pub fn kind(self) -> RequestKind {
        match self {
            Self::FindRecord => RequestKind::FindRecord,
            Self::FindMany => RequestKind::FindMany,
            Self::FindAll => RequestKind::FindAll,
            Self::Query => RequestKind::Query,
            Self::QueryRecord => RequestKind::QueryRecord,
            Self::CreateRecord => RequestKind::CreateRecord,
            Self::UpdateRecord => RequestKind::UpdateRecord,
            Self::DeleteRecord => RequestKind::DeleteRecord,
        }
    }
}

/// The schema and model a command works on.
#[derive(Args, Debug)]
pub struct Target {
    /// Schema file (`{ "models": [...] }`)
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Model name
    #[arg(short, long)]
    pub model: String,

    /// Key case policy
    #[arg(long, value_enum, default_value = "camel")]
    pub case: CaseStyle,
}

impl Target {
    pub fn config(&self) -> Config {
        let key_case = match self.case {
            CaseStyle::Camel => KeyCase::Camel,
            CaseStyle::Snake => KeyCase::Snake,
        };
        Config::new().key_case(key_case)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a store request to query text
    Compile {
        #[command(flatten)]
        target: Target,

        /// Request to compile
        #[arg(value_enum)]
        request: RequestArg,

        /// Record id (find-record, delete-record)
        #[arg(long)]
        id: Option<String>,

        /// Comma separated record ids (find-many); numeric ids are sent as numbers
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,

        /// Root field arguments as a JSON object (query, query-record)
        #[arg(long)]
        query: Option<String>,

        /// Record snapshot file (create-record, update-record)
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Normalize a server response into a document
    Normalize {
        #[command(flatten)]
        target: Target,

        /// Request the response answers
        #[arg(short, long, value_enum)]
        request: RequestArg,

        /// Response file
        #[arg(long)]
        response: PathBuf,

        /// Id of the requested record, used when the response omits it
        #[arg(long)]
        id: Option<String>,
    },

    /// Check schema files for relationships to unknown models
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// The owned inputs a [`Request`] borrows from.
#[derive(Debug)]
pub struct RequestInput {
    pub request: RequestArg,
    pub id: Option<String>,
    pub ids: Vec<Value>,
    pub query: Option<Map<String, Value>>,
    pub record: Option<RecordSnapshot>,
}

impl RequestInput {
    pub fn new(request: RequestArg) -> Self {
        Self {
            request,
            id: None,
            ids: Vec::new(),
            query: None,
            record: None,
        }
    }

    /// Builds the request, failing when a flag it needs was not given.
    pub fn request(&self) -> miette::Result<Request<'_>> {
        let request = match self.request {
            RequestArg::FindRecord => Request::FindRecord {
                id: self.require_id()?,
            },
            RequestArg::FindMany if self.ids.is_empty() => {
                return Err(missing_flag("--ids", self.request));
            }
            RequestArg::FindMany => Request::FindMany { ids: &self.ids },
            RequestArg::FindAll => Request::FindAll,
            RequestArg::Query => Request::Query {
                query: self.require_query()?,
            },
            RequestArg::QueryRecord => Request::QueryRecord {
                query: self.require_query()?,
            },
            RequestArg::CreateRecord => Request::CreateRecord {
                snapshot: self.require_record()?,
            },
            RequestArg::UpdateRecord => Request::UpdateRecord {
                snapshot: self.require_record()?,
            },
            RequestArg::DeleteRecord => Request::DeleteRecord {
                id: self.require_id()?,
            },
        };
        Ok(request)
    }

    fn require_id(&self) -> miette::Result<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| missing_flag("--id", self.request))
    }

    fn require_query(&self) -> miette::Result<&Map<String, Value>> {
        self.query
            .as_ref()
            .ok_or_else(|| missing_flag("--query", self.request))
    }

    fn require_record(&self) -> miette::Result<&RecordSnapshot> {
        self.record
            .as_ref()
            .ok_or_else(|| missing_flag("--record", self.request))
    }
}

fn missing_flag(flag: &str, request: RequestArg) -> miette::Report {
    miette!("`{flag}` is required for `{}` requests", request.kind())
}

pub fn run(cli: Cli) -> miette::Result<i32> {
    match cli.command {
        Commands::Compile {
            target,
            request,
            id,
            ids,
            query,
            record,
        } => {
            let registry = load_schema(&target.schema)?;
            let input = RequestInput {
                request,
                id,
                ids: ids.into_iter().map(id_value).collect(),
                query: query.as_deref().map(parse_query).transpose()?,
                record: record.as_deref().map(load_record).transpose()?,
            };
            let text = compile_request(&registry, &target.model, &input, &target.config())?;
            println!("{text}");
            Ok(0)
        }
        Commands::Normalize {
            target,
            request,
            response,
            id,
        } => {
            let registry = load_schema(&target.schema)?;
            let payload = read_json(&response)?;
            let document = normalize_payload(
                &registry,
                &target.model,
                request.kind(),
                &payload,
                id.as_deref(),
                &target.config(),
            )?;
            println!("{}", serde_json::to_string_pretty(&document).into_diagnostic()?);
            Ok(0)
        }
        Commands::Check { files } => check_files(&files, cli.verbose),
    }
}

/// Compiles a request against `model` to query text.
pub fn compile_request(
    registry: &SchemaRegistry,
    model: &str,
    input: &RequestInput,
    config: &Config,
) -> miette::Result<String> {
    let model = registry.model_for(model)?;
    let request = input.request()?;
    Ok(request.compile(model, registry, config)?)
}

/// Normalizes a raw response payload into a document value.
pub fn normalize_payload(
    registry: &SchemaRegistry,
    model: &str,
    kind: RequestKind,
    payload: &Value,
    primary_id: Option<&str>,
    config: &Config,
) -> miette::Result<Value> {
    ensure_no_errors(payload)?;
    let model = registry.model_for(model)?;
    let document = Normalizer::new(registry, config).normalize_response(model, payload, primary_id, kind)?;
    Ok(document.to_value())
}

/// Lists the relationships in `registry` that target unknown models.
pub fn dangling_report(registry: &SchemaRegistry) -> Vec<String> {
    registry
        .dangling_relationships()
        .into_iter()
        .map(|(model, rel)| format!("{}.{} targets unknown model `{}`", model.name, rel.key, rel.target))
        .collect()
}

fn check_files(files: &[PathBuf], verbose: bool) -> miette::Result<i32> {
    let mut has_errors = false;

    for file in files {
        if verbose {
            println!("{} {}", "Checking".blue(), file.display());
        }

        let registry = match load_schema(file) {
            Ok(registry) => registry,
            Err(report) => {
                has_errors = true;
                eprintln!("{} {}", "Error".red().bold(), file.display());
                eprintln!("  {} {}", "-->".blue(), report);
                continue;
            }
        };

        let problems = dangling_report(&registry);
        if problems.is_empty() {
            if verbose {
                println!("{} {} ({} models)", "OK".green(), file.display(), registry.len());
            }
            continue;
        }

        has_errors = true;
        eprintln!("{} {}", "Error".red().bold(), file.display());
        for problem in problems {
            eprintln!("  {} {}", "-->".blue(), problem);
        }
    }

    if has_errors {
        Ok(1)
    } else {
        println!(
            "{} {} file(s) checked",
            "Success:".green().bold(),
            files.len()
        );
        Ok(0)
    }
}

fn read_source(path: &Path) -> miette::Result<String> {
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))
}

fn read_json(path: &Path) -> miette::Result<Value> {
    serde_json::from_str(&read_source(path)?)
        .into_diagnostic()
        .wrap_err_with(|| format!("invalid JSON in {}", path.display()))
}

fn load_schema(path: &Path) -> miette::Result<SchemaRegistry> {
    let source = read_source(path)?;
    let registry = SchemaRegistry::from_json(&source)
        .wrap_err_with(|| format!("invalid schema in {}", path.display()))?;
    tracing::debug!(path = %path.display(), models = registry.len(), "loaded schema file");
    Ok(registry)
}

fn load_record(path: &Path) -> miette::Result<RecordSnapshot> {
    serde_json::from_str(&read_source(path)?)
        .into_diagnostic()
        .wrap_err_with(|| format!("invalid record snapshot in {}", path.display()))
}

fn id_value(id: String) -> Value {
    match id.parse::<u64>() {
        Ok(number) => Value::from(number),
        Err(_) => Value::String(id),
    }
}

fn parse_query(source: &str) -> miette::Result<Map<String, Value>> {
    match serde_json::from_str(source).into_diagnostic()? {
        Value::Object(map) => Ok(map),
        _ => Err(miette!("`--query` must be a JSON object")),
    }
}
