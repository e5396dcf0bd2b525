mod debug_report;

use entity_recognizer::{DEFAULT_RULES_DIR, EntityRecognizer, RecognizerConfig};
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

fn main() {
    env_logger::init();

    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let recognizer = match EntityRecognizer::from_config(cli.config) {
        Ok(recognizer) => recognizer,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };
    let detection = recognizer.find_entity_info_with_metrics(&cli.input);
    debug_report::print_run(&cli.input, &detection, recognizer.config(), cli.metrics, cli.color);
}

struct CliConfig {
    input: String,
    config: RecognizerConfig,
    metrics: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut rules: Option<PathBuf> = None;
    let mut locale: Option<String> = None;
    let mut region: Option<String> = None;
    let mut metrics = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("entity-recognizer {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--metrics" => metrics = true,
            "--rules" => rules = Some(PathBuf::from(expect_value(&mut args, "--rules")?)),
            "--config" => config_file = Some(PathBuf::from(expect_value(&mut args, "--config")?)),
            "--locale" => locale = Some(expect_value(&mut args, "--locale")?),
            "--region" => region = Some(expect_value(&mut args, "--region")?),
            "--input" | "-i" => {
                let value = expect_value(&mut args, "--input")?;
                set_input(&mut input, value)?;
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    set_input(&mut input, rest)?;
                }
                break;
            }
            _ if arg.starts_with("--rules=") => rules = Some(PathBuf::from(arg.trim_start_matches("--rules="))),
            _ if arg.starts_with("--config=") => {
                config_file = Some(PathBuf::from(arg.trim_start_matches("--config=")));
            }
            _ if arg.starts_with("--locale=") => locale = Some(arg.trim_start_matches("--locale=").to_string()),
            _ if arg.starts_with("--region=") => region = Some(arg.trim_start_matches("--region=").to_string()),
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=").to_string();
                set_input(&mut input, value)?;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                set_input(&mut input, rest)?;
                break;
            }
        }
    }

    let mut config = match config_file {
        Some(path) => read_config(&path)?,
        None => RecognizerConfig::default(),
    };
    if let Some(rules) = rules {
        config.rules_dir = Some(rules);
    }
    if let Some(locale) = locale {
        config.locale = locale;
    }
    if let Some(region) = region {
        config.region = region;
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, config, metrics, color })
}

fn expect_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next().ok_or_else(|| format!("error: {flag} expects a value"))
}

fn set_input(input: &mut Option<String>, value: String) -> Result<(), String> {
    if input.is_some() {
        return Err("error: input provided multiple times".to_string());
    }
    *input = Some(value);
    Ok(())
}

fn read_config(path: &Path) -> Result<RecognizerConfig, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("error: failed to read config {}: {err}", path.display()))?;
    RecognizerConfig::from_json(&raw).map_err(|err| format!("error: invalid config {}: {err}", path.display()))
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "entity-recognizer {version}

Find dates, times and phone numbers in text using JSON rule data.

Usage:
  entity-recognizer [OPTIONS] [--] <input...>
  entity-recognizer [OPTIONS] --input <text>

Options:
  -i, --input <text>         Input text. If omitted, reads remaining args
                             or stdin when no args are provided.
  --rules <dir>              Rule data directory (datetime/, phonenumber/).
                             Default: {default_rules}
  --config <file>            JSON recognizer configuration.
  --locale <tag>             Locale for date/time rules, e.g. en.
  --region <code>            Region for phone rules, e.g. CN.
  --metrics                  Print per-stage timings.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Logging is controlled with RUST_LOG, e.g. RUST_LOG=entity_recognizer=debug.

Exit codes:
  0  Success.
  1  Rule data could not be loaded.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        default_rules = DEFAULT_RULES_DIR
    )
}
