//! Purpose: `dictsort` CLI entry point; filters stdin or file operands to stdout.
//! Role: Binary crate root; parses args, wires inputs, maps errors to exit codes.
//! Invariants: Canonicalized text is the only thing written to stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `core::error::to_exit_code`.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

use dictsort::core::error::{Error, ErrorKind, to_exit_code};
use dictsort::core::scan::run_filter;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

#[derive(Parser)]
#[command(
    name = "dictsort",
    version,
    about = "Sort dict-like literal spans in test output for stable diffs",
    help_template = r#"{about-with-newline}
USAGE
  {usage}

ARGUMENTS
{positionals}

OPTIONS
{options}
"#
)]
struct Cli {
    /// Files to filter in order; with no operands (or `-`) stdin is read
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Generate a completion script for the given shell and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse_from(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                return Ok(RunOutcome::ok());
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `dictsort --help`."));
            }
        },
    };

    init_tracing();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::aot::generate(shell, &mut cmd, "dictsort", &mut io::stdout());
        return Ok(RunOutcome::ok());
    }

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    if cli.files.is_empty() {
        let stdin = io::stdin();
        run_filter(stdin.lock(), &mut writer)?;
        return Ok(RunOutcome::ok());
    }

    for path in &cli.files {
        if path.as_os_str() == "-" {
            let stdin = io::stdin();
            run_filter(stdin.lock(), &mut writer)?;
            continue;
        }
        let file = File::open(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to open input file")
                .with_path(path)
                .with_source(err)
                .with_hint("Check that the file exists and is readable.")
        })?;
        run_filter(BufReader::new(file), &mut writer)?;
    }
    Ok(RunOutcome::ok())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn emit_error(err: &Error) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, true));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = std::error::Error::source(err);
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));
    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    for cause in error_causes(err) {
        lines.push(format!(
            "{} {cause}",
            colorize_label("cause:", use_color, AnsiColor::Yellow)
        ));
    }
    lines.join("\n")
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

#[cfg(test)]
mod tests {
    use super::{AnsiColor, colorize_label, error_json, error_text};
    use dictsort::core::error::{Error, ErrorKind};

    #[test]
    fn error_json_has_required_fields() {
        let err = Error::new(ErrorKind::Io)
            .with_message("failed to open input file")
            .with_path("/tmp/missing.log")
            .with_hint("Check that the file exists and is readable.");
        let value = error_json(&err);
        let obj = value
            .get("error")
            .and_then(|v| v.as_object())
            .expect("error object");
        assert_eq!(obj.get("kind").and_then(|v| v.as_str()), Some("Io"));
        assert_eq!(
            obj.get("message").and_then(|v| v.as_str()),
            Some("failed to open input file")
        );
        assert_eq!(
            obj.get("path").and_then(|v| v.as_str()),
            Some("/tmp/missing.log")
        );
        assert!(obj.get("hint").is_some());
    }

    #[test]
    fn error_text_respects_color_flag() {
        let err = Error::new(ErrorKind::Usage).with_message("bad input");
        let colored = error_text(&err, true);
        assert!(colored.contains("\u{1b}[31m"));
        let plain = error_text(&err, false);
        assert!(!plain.contains("\u{1b}["));
        assert!(plain.starts_with("error: bad input"));
    }

    #[test]
    fn colorize_label_passthrough_when_disabled() {
        assert_eq!(colorize_label("error:", false, AnsiColor::Red), "error:");
    }
}
