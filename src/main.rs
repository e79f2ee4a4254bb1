use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use noodle::json::{self, JsonStyle};
use noodle::{Error, Group, ParseOptions, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "noodle", version, about = "Parse a Noodle document and print it as JSON")]
struct Args {
    /// Input file path. Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Print only the value at this dotted path (repeatable), e.g. `window.size[0]`.
    #[arg(short, long = "get", value_name = "path")]
    get: Vec<String>,

    /// Emit compact JSON instead of pretty-printed JSON.
    #[arg(long)]
    compact: bool,

    /// Reject documents with groups nested deeper than this.
    #[arg(long, value_name = "number")]
    max_depth: Option<usize>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("noodle=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let options = ParseOptions {
        max_depth: args.max_depth,
    };

    let (stdin_text, result) = match args.input.as_deref() {
        None | Some("-") => {
            let mut input = String::new();
            if let Err(err) = io::stdin().read_to_string(&mut input) {
                eprintln!("ERROR: failed to read stdin: {}", err);
                return ExitCode::FAILURE;
            }
            let result = noodle::parse_with_options(&input, &options);
            (Some(input), result)
        }
        Some(path) => (None, noodle::parse_file_with_options(path, &options)),
    };

    let root = match result {
        Ok(root) => root,
        Err(err) => {
            let source = stdin_text
                .or_else(|| {
                    args.input
                        .as_deref()
                        .and_then(|path| std::fs::read_to_string(path).ok())
                })
                .unwrap_or_default();
            report(&source, &err);
            return ExitCode::FAILURE;
        }
    };

    let style = if args.compact {
        JsonStyle::Compact
    } else {
        JsonStyle::Pretty
    };

    if args.get.is_empty() {
        println!("{}", json::value_to_json(Value::Group(&root), style));
        return ExitCode::SUCCESS;
    }
    print_queries(&root, &args.get, style)
}

fn print_queries(root: &Group, paths: &[String], style: JsonStyle) -> ExitCode {
    let mut status = ExitCode::SUCCESS;
    for path in paths {
        match root.query(path) {
            Ok(Value::String(s)) => println!("{}", s),
            Ok(value) => println!("{}", json::value_to_json(value, style)),
            Err(err) => {
                eprintln!("ERROR: {}", err);
                status = ExitCode::FAILURE;
            }
        }
    }
    status
}

/// Print the error with the offending line and a caret under the token.
fn report(input: &str, err: &Error) {
    let Some(pos) = err.position() else {
        eprintln!("ERROR: {}", err);
        return;
    };

    let line_text = input.lines().nth(pos.line).unwrap_or("");
    eprintln!("ERROR AT LINE {}:", pos.line + 1);
    eprintln!("{}", line_text);

    let width = match err {
        Error::UnexpectedToken { span, .. } => span.len(),
        Error::DuplicateName { name, .. } => name.len(),
        _ => 1,
    };
    // Multi-line tokens are underlined to the end of their first line.
    let width = width
        .min(line_text.len().saturating_sub(pos.column))
        .max(1);

    let mut underline = " ".repeat(pos.column);
    underline.push('^');
    underline.push_str(&"_".repeat(width - 1));
    eprintln!("{}", underline);
    eprintln!("{}", err);
}
