// src/main.rs

use std::env;
use std::error::Error;
use std::path::PathBuf;

use log::{error, info};

use lab_reduction::constants::DEFAULT_OUTPUT_DIR;
use lab_reduction::crate_version;
use lab_reduction::data_input::config::LabConfig;
use lab_reduction::error::ReductionResult;
use lab_reduction::experiments::run_all;
use lab_reduction::report::{ConsoleSink, CsvSink, PlotSink, ReportSink};

struct Args {
    config: Option<PathBuf>,
    output_dir: PathBuf,
    plots: bool,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} [CONFIG.json] [--output-dir DIR] [--no-plots]");
    eprintln!("  CONFIG.json        JSON file overriding the built-in datasets");
    eprintln!("  --output-dir DIR   where CSV files and charts go (default: {DEFAULT_OUTPUT_DIR})");
    eprintln!("  --no-plots         skip PNG rendering");
    eprintln!("  --version          print the version and exit");
    eprintln!("Log verbosity follows RUST_LOG (e.g. RUST_LOG=debug).");
}

fn parse_args(args: &[String]) -> Result<Option<Args>, String> {
    let mut parsed = Args {
        config: None,
        output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        plots: true,
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(None),
            "--version" => {
                println!("lab_reduction {}", crate_version());
                std::process::exit(0);
            }
            "--no-plots" => parsed.plots = false,
            "--output-dir" => {
                i += 1;
                let dir = args.get(i).ok_or("--output-dir needs a directory")?;
                parsed.output_dir = PathBuf::from(dir);
            }
            arg if arg.starts_with('-') => return Err(format!("unknown option {arg}")),
            arg => {
                if parsed.config.is_some() {
                    return Err(format!("unexpected argument {arg}"));
                }
                parsed.config = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }
    Ok(Some(parsed))
}

fn run(args: &Args) -> ReductionResult<()> {
    let config = LabConfig::load(args.config.as_deref())?;
    let reports = run_all(&config)?;

    let mut console = ConsoleSink::stdout();
    let mut csv = CsvSink::new(&args.output_dir);
    let mut plots = PlotSink::new(&args.output_dir);
    for report in &reports {
        console.emit(report)?;
        csv.emit(report)?;
        if args.plots {
            plots.emit(report)?;
        }
    }

    println!(
        "\nWrote {} CSV file(s) and {} chart(s) to {}",
        csv.written().len(),
        plots.written().len(),
        args.output_dir.display()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("lab_reduction");
    let parsed = match parse_args(&args) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage(program);
            return Ok(());
        }
        Err(message) => {
            eprintln!("Error: {message}");
            print_usage(program);
            std::process::exit(1);
        }
    };

    info!("lab_reduction {}", crate_version());
    if let Err(err) = run(&parsed) {
        error!("{err}");
        std::process::exit(err.exit_code());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("lab_reduction")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn defaults_without_arguments() {
        let parsed = parse_args(&args(&[])).unwrap().unwrap();
        assert!(parsed.config.is_none());
        assert_eq!(parsed.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert!(parsed.plots);
    }

    #[test]
    fn config_output_dir_and_no_plots() {
        let parsed = parse_args(&args(&["lab.json", "--output-dir", "out", "--no-plots"]))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("lab.json")));
        assert_eq!(parsed.output_dir, PathBuf::from("out"));
        assert!(!parsed.plots);
    }

    #[test]
    fn help_requests_usage() {
        assert!(parse_args(&args(&["--help"])).unwrap().is_none());
        assert!(parse_args(&args(&["-h"])).unwrap().is_none());
    }

    #[test]
    fn usage_errors() {
        let missing = parse_args(&args(&["--output-dir"])).err().unwrap();
        assert!(missing.contains("--output-dir needs a directory"));

        let unknown = parse_args(&args(&["--plots-only"])).err().unwrap();
        assert_eq!(unknown, "unknown option --plots-only");

        let extra = parse_args(&args(&["a.json", "b.json"])).err().unwrap();
        assert_eq!(extra, "unexpected argument b.json");
    }
}
