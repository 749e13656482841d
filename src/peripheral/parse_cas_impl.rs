use std::{fmt, path::Path, path::PathBuf};

use clap::Parser;

use crate::cas::{
    reader::{CasReader, StatementReader},
    value::CasValue,
};
use crate::util::{
    json::{to_json_string, JsonStyle},
    rw::WriteHandle,
};
use crate::write_errln;

/// The failure of a statement read, or of encoding its result.
///
/// Every failure is reported the same way, regardless of where it came from.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct DelegatedFailure {
    pub message: String,
}

impl DelegatedFailure {
    pub fn new(message: String) -> Self {
        DelegatedFailure { message }
    }

    /// {"error": message}, always in the spaced style.
    pub fn to_json(&self) -> String {
        let doc = serde_json::json!({ "error": self.message });
        to_json_string(&doc, JsonStyle::Spaced).unwrap_or_else(|e| {
            tracing::error!("Unable to encode error document: {e}");
            r#"{"error": "Unable to encode error message"}"#.to_string()
        })
    }
}

impl fmt::Display for DelegatedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

pub fn read_statement(
    reader: &dyn CasReader,
    filepath: &Path,
    password: &str,
) -> Result<CasValue, DelegatedFailure> {
    reader
        .read(filepath, password)
        .map_err(DelegatedFailure::new)
}

/// Reads the statement and renders it as JSON.
///
/// Ok holds the JSON document for stdout. Err holds the error document for
/// stderr.
pub fn convert(
    reader: &dyn CasReader,
    filepath: &Path,
    password: &str,
    style: JsonStyle,
) -> Result<String, String> {
    read_statement(reader, filepath, password)
        .and_then(|v| to_json_string(&v, style).map_err(DelegatedFailure::new))
        .map_err(|f| {
            tracing::debug!("Conversion of {} failed: {}", filepath.display(), f);
            f.to_json()
        })
}

/// Parses a CAMS or KFintech Consolidated Account Statement (CAS) PDF, and
/// prints its contents as JSON.
///
/// On failure, prints {"error": "<message>"} to stderr instead, and exits
/// with status 1.
#[derive(Parser, Debug)]
#[command(author, about, long_about)]
pub struct Args {
    /// CAS PDF file
    ///
    /// This can also be a .txt file with text emitted by cas-pdf-text, which
    /// will be parsed as-is.
    #[arg(required = true)]
    pub filepath: PathBuf,

    /// Password of the PDF
    #[arg(long, default_value = "")]
    pub password: String,

    /// Print indented JSON
    #[arg(short = 'p', long)]
    pub pretty: bool,

    /// Print JSON without any spaces between elements
    #[arg(long, conflicts_with = "pretty")]
    pub compact: bool,

    /// Turn on debug tracing of statement parsing
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    fn json_style(&self) -> JsonStyle {
        if self.pretty {
            JsonStyle::Pretty
        } else if self.compact {
            JsonStyle::Compact
        } else {
            JsonStyle::Spaced
        }
    }
}

pub fn run() -> Result<(), ()> {
    let args = Args::parse();
    run_with_args(
        args,
        WriteHandle::stdout_write_handle(),
        WriteHandle::stderr_write_handle(),
    )
}

pub fn run_with_args(args: Args, out_w: WriteHandle, err_w: WriteHandle) -> Result<(), ()> {
    if args.debug {
        crate::tracing::enable_trace_env("casparse::cas=debug");
    }
    crate::tracing::setup_tracing();

    run_with_reader(&StatementReader::new(), args, out_w, err_w)
}

pub fn run_with_reader(
    reader: &dyn CasReader,
    args: Args,
    mut out_w: WriteHandle,
    mut err_w: WriteHandle,
) -> Result<(), ()> {
    match convert(reader, &args.filepath, &args.password, args.json_style()) {
        Ok(json) => {
            use std::io::Write;
            writeln!(out_w, "{json}").map_err(|e| {
                let f = DelegatedFailure::new(format!("Unable to write output: {e}"));
                write_errln!(err_w, "{}", f.to_json());
            })?;
            let _ = out_w.flush();
            Ok(())
        }
        Err(err_json) => {
            write_errln!(err_w, "{}", err_json);
            Err(())
        }
    }
}

// MARK: tests
