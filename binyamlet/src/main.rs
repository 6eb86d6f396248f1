//! Yamlet command-line tool for checking, formatting, and transcoding Yamlet
//! documents.
//!
//! Usage: yamlet [OPTIONS] [FILE|DIR]
//!
//! Options:
//!   -t, --to <FORMAT>      Output format (yamlet, json, debug, yaml, toml, cbor, diag)
//!   -w, --write            Write output to file with inferred name
//!   -o, --output <FILE>    Write output to specified file
//!   --check                Check if file is valid (exit 0 if valid, 1 if invalid)
//!   --max-depth <N>        Maximum nesting depth
//!   -h, --help             Print help
//!   -V, --version          Print version

use libyamlet::{encode, parse_with_options, Format, ParseError, ParseOptions};
use log::{debug, info};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process;

mod transcode;

/// Output format selected with `-t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// Rendered by libyamlet.
    Text(Format),
    Yaml,
    Toml,
    Cbor,
    CborDiag,
}

fn parse_target(s: &str) -> Option<Target> {
    match s {
        "yamlet" => Some(Target::Text(Format::Yamlet)),
        "json" => Some(Target::Text(Format::Json)),
        "debug" => Some(Target::Text(Format::Debug)),
        "yaml" | "yml" => Some(Target::Yaml),
        "toml" => Some(Target::Toml),
        "cbor" => Some(Target::Cbor),
        "diag" => Some(Target::CborDiag),
        _ => None,
    }
}

/// Extension used by `--write`. Canonical Yamlet output replaces the input
/// file; YAML output gets `.yml` so it does not.
fn target_extension(target: Target) -> &'static str {
    match target {
        Target::Text(Format::Yamlet) => "yaml",
        Target::Text(Format::Json) => "json",
        Target::Text(Format::Debug) => "txt",
        Target::Yaml => "yml",
        Target::Toml => "toml",
        Target::Cbor => "cbor",
        Target::CborDiag => "diag",
    }
}

/// Settings shared by every input processed in one run.
struct Settings<'a> {
    target: Target,
    output_file: Option<&'a str>,
    write_back: bool,
    check_only: bool,
    options: ParseOptions,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut target = Target::Text(Format::Yamlet);
    let mut write_back = false;
    let mut output_file: Option<&str> = None;
    let mut check_only = false;
    let mut options = ParseOptions::default();
    let mut input_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("yamlet {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "-t" | "--to" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: -t requires a format argument");
                    process::exit(1);
                }
                target = match parse_target(&args[i]) {
                    Some(t) => t,
                    None => {
                        eprintln!("Error: Unknown format: {}", args[i]);
                        process::exit(1);
                    }
                };
            }
            "-w" | "--write" => {
                write_back = true;
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires an argument");
                    process::exit(1);
                }
                output_file = Some(&args[i]);
            }
            "--check" => {
                check_only = true;
            }
            "--max-depth" => {
                i += 1;
                let depth = args.get(i).and_then(|s| s.parse::<usize>().ok());
                match depth {
                    Some(d) => options = options.with_max_depth(d),
                    None => {
                        eprintln!("Error: --max-depth requires a non-negative integer");
                        process::exit(1);
                    }
                }
            }
            "-" => {
                // Explicit stdin
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            _ => {
                if input_path.is_some() {
                    eprintln!("Error: Multiple input paths not supported");
                    process::exit(1);
                }
                input_path = Some(&args[i]);
            }
        }
        i += 1;
    }

    if write_back && output_file.is_some() {
        eprintln!("Error: --write and --output are mutually exclusive");
        process::exit(1);
    }

    let settings = Settings {
        target,
        output_file,
        write_back,
        check_only,
        options,
    };

    if let Some(path) = input_path {
        if Path::new(path).is_dir() {
            if output_file.is_some() {
                eprintln!("Error: --output cannot be used with directory input");
                process::exit(1);
            }
            process::exit(process_directory(path, &settings));
        }
    }

    let input: Vec<u8> = match input_path {
        Some(path) => match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            buffer
        }
    };

    process::exit(process_input(&input, input_path, &settings));
}

fn is_yamlet_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

fn process_directory(dir_path: &str, settings: &Settings) -> i32 {
    let entries = match fs::read_dir(dir_path) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir_path, e);
            return 1;
        }
    };

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| is_yamlet_file(path))
        .collect();
    paths.sort();
    info!("processing {} files in {}", paths.len(), dir_path);

    let mut had_errors = false;
    for path in paths {
        let path_str = path.to_string_lossy();
        let input = match fs::read(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path_str, e);
                had_errors = true;
                continue;
            }
        };
        if process_input(&input, Some(path_str.as_ref()), settings) != 0 {
            had_errors = true;
        }
    }

    if had_errors {
        1
    } else {
        0
    }
}

/// Render a parse failure the way editors expect: `path:line:col: message`.
fn report_error(err: &ParseError, input: &[u8], input_file: Option<&str>) -> String {
    match input_file {
        Some(path) => {
            let location = err.location(input);
            format!("{}:{}: {}", path, location, err.kind)
        }
        None => format!("Parse error: {}", err),
    }
}

fn process_input(input: &[u8], input_file: Option<&str>, settings: &Settings) -> i32 {
    debug!(
        "parsing {} ({} bytes)",
        input_file.unwrap_or("<stdin>"),
        input.len()
    );
    let doc = match parse_with_options(input, &settings.options) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{}", report_error(&e, input, input_file));
            return 1;
        }
    };

    if settings.check_only {
        if let Some(path) = input_file {
            println!("{}: ok", path);
        }
        return 0;
    }

    let target = settings.target;
    let written = match target {
        Target::Text(format) => write_text_output(&encode(&doc, format), input_file, settings),
        Target::Yaml => match transcode::yaml::encode(&doc) {
            Ok(output) => write_text_output(&output, input_file, settings),
            Err(e) => {
                eprintln!("Error: Cannot convert to YAML: {}", e);
                return 1;
            }
        },
        Target::Toml => match transcode::toml::encode(&doc) {
            Ok(output) => write_text_output(&output, input_file, settings),
            Err(e) => {
                eprintln!("Error: Cannot convert to TOML: {}", e);
                return 1;
            }
        },
        Target::Cbor => write_binary_output(&transcode::cbor::encode(&doc), input_file, settings),
        Target::CborDiag => {
            // Render from the wire encoding so the notation shows what `cbor` emits.
            let bytes = transcode::cbor::encode(&doc);
            match transcode::cbor::diagnostic(&bytes) {
                Ok(output) => write_text_output(&output, input_file, settings),
                Err(e) => {
                    eprintln!("Error: Cannot render CBOR diagnostic notation: {}", e);
                    return 1;
                }
            }
        }
    };

    match written {
        Ok(()) => 0,
        Err(message) => {
            eprintln!("{}", message);
            1
        }
    }
}

/// Destination chosen by `-o`/`-w`, or `None` for stdout.
fn output_destination(
    input_file: Option<&str>,
    settings: &Settings,
) -> Result<Option<String>, String> {
    if let Some(path) = settings.output_file {
        return Ok(Some(path.to_string()));
    }
    if !settings.write_back {
        return Ok(None);
    }
    match input_file {
        Some(input_path) => {
            let ext = target_extension(settings.target);
            let output_path = Path::new(input_path).with_extension(ext);
            Ok(Some(output_path.to_string_lossy().to_string()))
        }
        None => Err("Error: --write requires an input file".to_string()),
    }
}

fn write_text_output(output: &str, input_file: Option<&str>, settings: &Settings) -> Result<(), String> {
    match output_destination(input_file, settings)? {
        Some(path) => fs::write(&path, output).map_err(|e| format!("Error writing {}: {}", path, e)),
        None => {
            print!("{}", output);
            // Ensure output ends with newline
            if !output.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

fn write_binary_output(output: &[u8], input_file: Option<&str>, settings: &Settings) -> Result<(), String> {
    match output_destination(input_file, settings)? {
        Some(path) => fs::write(&path, output).map_err(|e| format!("Error writing {}: {}", path, e)),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output)
                .and_then(|()| handle.flush())
                .map_err(|e| format!("Error writing to stdout: {}", e))
        }
    }
}

fn print_help() {
    println!(
        "yamlet - Yamlet command-line tool

USAGE:
    yamlet [OPTIONS] [FILE|DIR]

ARGS:
    [FILE|DIR]    Input file or directory (reads from stdin if not provided or '-')
                  When a directory is given, processes all .yaml and .yml files in it

OPTIONS:
    -t, --to <FORMAT>      Output format [default: yamlet]
                           Supported: yamlet, json, debug, yaml, toml, cbor, diag

    -w, --write            Write output to file with inferred extension

    -o, --output <FILE>    Write output to specified file (not valid with directory input)

    --check                Check if input is valid (exit 0 if valid, 1 if invalid)

    --max-depth <N>        Maximum nesting depth [default: {}]

    -h, --help             Print help

    -V, --version          Print version

ENVIRONMENT:
    RUST_LOG               Log filter (e.g. debug, libyamlet=trace) [default: warn]

EXAMPLES:
    # Reformat a file to canonical Yamlet
    yamlet config.yaml

    # Validate all files in a directory
    yamlet --check ./configs/

    # Convert to JSON
    yamlet -t json config.yaml

    # Convert to TOML (fails on null values)
    yamlet -t toml config.yaml -o config.toml

    # View the CBOR encoding in diagnostic notation (RFC 8949 §8)
    yamlet -t diag config.yaml

    # Convert every file in a directory to JSON
    yamlet -t json -w ./configs/
",
        ParseOptions::DEFAULT_MAX_DEPTH
    );
}
