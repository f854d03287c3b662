use clap::{App, Arg, ErrorKind};
use io::Read;
use log::info;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use super::CompilerError;
use crate::codegen::{Generator, RequestLog};
use crate::errors::{CodeError, CompileError};
use crate::syntax::{Position, Source};
use crate::CompilerPasses;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitKind {
    RenderRequests,
    CallGraph,
}

impl EmitKind {
    pub fn variants() -> impl Iterator<Item = EmitKind> {
        [Self::RenderRequests, Self::CallGraph].into_iter()
    }
}

impl fmt::Display for EmitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitKind::RenderRequests => write!(f, "render-requests"),
            EmitKind::CallGraph => write!(f, "call-graph"),
        }
    }
}

impl FromStr for EmitKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::variants()
            .find(|x| x.to_string() == s)
            .ok_or_else(|| format!("Unknown emit option: `{}`", s))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct CompilerOptions {
    pub emit: EmitKind,
    /// `None` reads the syntax tree from stdin.
    pub filepath: Option<String>,
    /// `None` writes to stdout.
    pub output: Option<String>,
    /// Project name passed to the build file template.
    pub module: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            emit: EmitKind::RenderRequests,
            filepath: None,
            output: None,
            module: "main".to_string(),
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Default)]
pub struct Command {}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles the syntax tree named by `args`. Returns the output unless it
    /// was written to the `--output` file, in which case the result is empty.
    pub fn run(
        &self,
        args: impl ExactSizeIterator<Item = String>,
    ) -> Result<String, CompilerError> {
        let options = parse_options(args)?;

        let src = if let Some(ref filepath) = options.filepath {
            read_from_file(filepath)?
        } else {
            read_from_stdin()?
        };
        info!("read {} bytes of syntax tree", src.len());

        let output = compile_source(&src, &options)?;

        if let Some(ref path) = options.output {
            fs::write(path, &output)?;
            info!("wrote {}", path);
            return Ok(String::new());
        }

        Ok(output)
    }
}

fn parse_options(
    args: impl ExactSizeIterator<Item = String>,
) -> Result<CompilerOptions, CompilerError> {
    let mut options = CompilerOptions::new();

    let emit_possible_values = EmitKind::variants()
        .map(|b| b.to_string())
        .collect::<Vec<_>>();
    let emit_possible_values: Vec<&str> =
        emit_possible_values.iter().map(AsRef::as_ref).collect();

    let matches = match app(&emit_possible_values).get_matches_from_safe(args) {
        Ok(matches) => matches,
        Err(err) if is_informational(&err) => err.exit(),
        Err(err) => return Err(err.message.into()),
    };

    if let Some(emit) = matches.value_of("emit") {
        options.emit = emit.parse::<EmitKind>()?;
    }

    if let Some(filepath) = matches.value_of("INPUT") {
        options.filepath = Some(filepath.to_string());

        if let Some(stem) = Path::new(filepath).file_stem().and_then(|s| s.to_str()) {
            options.module = stem.to_string();
        }
    }

    if let Some(output) = matches.value_of("output") {
        options.output = Some(output.to_string());
    }

    if let Some(module) = matches.value_of("module") {
        options.module = module.to_string();
    }

    Ok(options)
}

fn app<'b>(emit_possible_values: &[&'b str]) -> App<'static, 'b> {
    App::new("ffslc")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::with_name("emit")
                .long("emit")
                .takes_value(true)
                .possible_values(emit_possible_values),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("o")
                .takes_value(true)
                .help("Writes the output to this file instead of stdout"),
        )
        .arg(
            Arg::with_name("module")
                .long("module")
                .takes_value(true)
                .help("Names the generated project"),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the syntax tree (JSON) to compile")
                .required(false)
                .index(1),
        )
}

/// `--help` and `--version` come back from clap as errors, but they are
/// answers, not failures.
fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind,
        ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed
    )
}

/// Reads the front end's syntax tree. A malformed document is a parse error
/// at the line and column where the JSON parser gave up.
fn parse_source(src: &str, filename: &str) -> Result<Source, CompileError> {
    serde_json::from_str(src).map_err(|err| {
        let position = Position::new(filename, err.line() as u32, err.column() as u32);
        let message = err.to_string();
        let location = format!(" at line {} column {}", err.line(), err.column());
        let message = message.strip_suffix(&location).unwrap_or(&message);

        CodeError::parse_error(position, format!("malformed syntax tree: {}", message)).into()
    })
}

fn compile_source(src: &str, options: &CompilerOptions) -> Result<String, CompilerError> {
    let filename = options.filepath.as_deref().unwrap_or("<stdin>");
    let source = parse_source(src, filename)?;

    let mut passes = CompilerPasses::new();
    passes.apply(&source)?;
    info!("analyzed {} items", source.items.len());

    let output = match options.emit {
        EmitKind::RenderRequests => {
            let mut log = RequestLog::new();

            Generator::new(&source, &mut log)?.project(&source, &options.module)?;
            info!("issued {} render requests", log.requests().len());
            serde_json::to_string_pretty(log.requests())?
        }
        EmitKind::CallGraph => serde_json::to_string_pretty(passes.call_graph()?)?,
    };

    Ok(output)
}

fn read_from_stdin() -> Result<String, io::Error> {
    let mut content = String::new();

    io::stdin().read_to_string(&mut content)?;

    Ok(content)
}

fn read_from_file(filename: &str) -> io::Result<String> {
    fs::read_to_string(filename)
}
