//! Runs one query expression against a JSON document and prints what it selects.
//!
//! ```text
//! docjoin <document.json> <expression> [settings file]
//! ```
//!
//! Log output is controlled through `RUST_LOG`, e.g. `RUST_LOG=docjoin=trace`.

use std::env;
use std::path::Path;
use std::process::ExitCode;

use serde_json::Value;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use docjoin::document::Document;
use docjoin::error::{DocjoinError, Result};
use docjoin::query::{Expression, Fragment, PathQuery, Query};
use docjoin::settings::Settings;

fn main() -> ExitCode {
    init_tracing();
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("usage: docjoin <document.json> <expression> [settings file]");
        return ExitCode::from(2);
    }
    match run(&args[0], &args[1], args.get(2).map(Path::new)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "query failed");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str, expression: &str, settings: Option<&Path>) -> Result<()> {
    let settings = Settings::load(settings)?;
    debug!(max_depth = settings.max_depth(), "settings loaded");
    let document = Document::read(path)?;
    let value: Value = serde_json::from_slice(document.bytes())
        .map_err(|e| DocjoinError::DecodeFailure {
            context: path.to_string(),
            source: e,
        })?;
    let fragment = PathQuery::new().query(&value, &Expression::new(expression))?;
    let output = match fragment {
        Fragment::Missing => Value::Null,
        Fragment::One(value) => value,
        Fragment::Many(values) => Value::Array(values),
    };
    let rendered = serde_json::to_string_pretty(&output).map_err(|e| DocjoinError::DecodeFailure {
        context: "output".to_string(),
        source: e,
    })?;
    println!("{}", rendered);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
