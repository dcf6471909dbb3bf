//! CLI tool for annotating return types in a TypeScript file
//!
//! Usage: tsannotate [options] <file.ts | ->
//!
//! Options:
//!   --config <file>   JSON options file (strictNullChecks, newLine, includeLib)
//!   --strict          Infer with strict null checks
//!   --crlf            Write CRLF line endings
//!   --check           Print nothing; exit 1 when the file would change
//!   --report          Print the inserted annotations as JSON instead of the text
//!
//! `-` reads the source from stdin. Set `TSANNOTATE_LOG=debug` for logs.

use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use tsannotate::tracing_config::init_tracing;
use tsannotate::{AnnotateError, AnnotateOptions, NewLine};

fn main() {
    init_tracing();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Print,
    Check,
    Report,
}

/// Where the source comes from.
enum Input {
    File(PathBuf),
    Stdin,
}

/// CLI configuration
struct Config {
    input: Input,
    options: AnnotateOptions,
    mode: Mode,
}

fn usage(program_name: &str) -> String {
    format!(
        "Usage: {} [--config <file>] [--strict] [--crlf] [--check | --report] <file.ts | ->",
        program_name
    )
}

fn parse_args() -> Result<Config, Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map_or("tsannotate", |s| s.as_str());

    let mut config_path: Option<PathBuf> = None;
    let mut strict = false;
    let mut crlf = false;
    let mut mode = Mode::Print;
    let mut input: Option<Input> = None;

    let mut i = 1;
    while i < args.len() {
        let Some(arg) = args.get(i) else {
            break;
        };
        match arg.as_str() {
            "--config" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| "--config requires a value".to_string())?;
                config_path = Some(PathBuf::from(path));
            }
            "--strict" => strict = true,
            "--crlf" => crlf = true,
            "--check" => mode = Mode::Check,
            "--report" => mode = Mode::Report,
            "-h" | "--help" => return Err(usage(program_name).into()),
            "-" => input = Some(Input::Stdin),
            other if other.starts_with('-') => {
                return Err(format!("Unknown option: {}", other).into());
            }
            other => input = Some(Input::File(PathBuf::from(other))),
        }
        i += 1;
    }

    let input = input.ok_or_else(|| usage(program_name))?;

    let mut options = match config_path {
        Some(path) => AnnotateOptions::load(&path)?,
        None => AnnotateOptions::default(),
    };
    // Flags override the options file.
    if strict {
        options.strict_null_checks = true;
    }
    if crlf {
        options.new_line = NewLine::Crlf;
    }

    Ok(Config {
        input,
        options,
        mode,
    })
}

fn read_input(input: &Input) -> Result<String, AnnotateError> {
    match input {
        Input::File(path) => fs::read_to_string(path).map_err(|e| AnnotateError::io(path, e)),
        Input::Stdin => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map_err(|e| AnnotateError::io("<stdin>", e))?;
            Ok(source)
        }
    }
}

/// Returns the process exit code.
fn run() -> Result<i32, Box<dyn std::error::Error>> {
    let config = parse_args()?;
    let source = read_input(&config.input)?;

    let annotated = tsannotate::annotate(&source, &config.options).map_err(|e| match &config.input {
        Input::File(path) => e.with_file(path),
        Input::Stdin => e,
    })?;

    let mut stdout = io::stdout().lock();
    match config.mode {
        Mode::Print => stdout.write_all(annotated.text.as_bytes())?,
        Mode::Check => {
            if annotated.text != source {
                return Ok(1);
            }
        }
        Mode::Report => {
            serde_json::to_writer_pretty(&mut stdout, &annotated.annotations)?;
            writeln!(stdout)?;
        }
    }
    Ok(0)
}
