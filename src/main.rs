use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ns3_trace_extractor::{Config, Dispatcher, Ffprobe};

fn cli() -> Command {
    Command::new("ns3-trace-extractor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("MPEG-4 video trace extractor for ns-3")
        .arg(
            Arg::new("inputs")
                .value_name("input.mp4")
                .help("The input file(s)")
                .num_args(0..)
                .value_parser(clap::value_parser!(PathBuf))
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet")
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Disable logging")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("ffprobe-path")
                .long("ffprobe-path")
                .value_name("PATH")
                .help("Path to the ffprobe binary")
                .value_parser(clap::value_parser!(PathBuf))
        )
        .arg(
            Arg::new("no-scan")
                .long("no-scan")
                .help("Do not read files from the input directory")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("input-dir")
                .long("input-dir")
                .value_name("DIR")
                .help("Directory scanned for input files [default: input]")
                .value_parser(clap::value_parser!(PathBuf))
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Output directory for trace files [default: output]")
                .value_parser(clap::value_parser!(PathBuf))
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .value_name("NUM")
                .help("Maximum number of files processed at once [default: one per file]")
                .value_parser(clap::value_parser!(usize))
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .value_parser(clap::value_parser!(PathBuf))
        )
}

/// Verbose mode raises this crate to debug; dependencies stay at info
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "ns3_trace_extractor=debug,info"
    } else {
        "ns3_trace_extractor=info,warn"
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));

    tracing_subscriber::fmt()
        .with_target(verbose)
        .with_thread_ids(verbose)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    init_logging(matches.get_flag("verbose"), matches.get_flag("quiet"));

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    if let Some(path) = matches.get_one::<PathBuf>("ffprobe-path") {
        config.ffprobe_path = Some(path.clone());
    }
    if matches.get_flag("no-scan") {
        config.scan_input_dir = false;
    }
    if let Some(dir) = matches.get_one::<PathBuf>("input-dir") {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = matches.get_one::<PathBuf>("output-dir") {
        config.output_dir = dir.clone();
    }
    if let Some(jobs) = matches.get_one::<usize>("jobs") {
        config.max_workers = Some(*jobs);
    }
    config.validate()?;

    tracing::debug!("{}", config.summary());

    let inputs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("inputs")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let probe = Ffprobe::new(config.ffprobe_path.clone());
    let dispatcher = Dispatcher::new(config, probe);
    let outcome = dispatcher.run(inputs).await;

    std::process::exit(outcome.exit_code());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        cli().debug_assert();
    }

    #[test]
    fn test_cli_parses_inputs_and_flags() {
        let matches = cli()
            .try_get_matches_from([
                "ns3-trace-extractor",
                "a.mp4",
                "b.mp4",
                "--no-scan",
                "--ffprobe-path",
                "/opt/ffprobe",
                "-j",
                "2",
            ])
            .unwrap();

        let inputs: Vec<&PathBuf> = matches.get_many::<PathBuf>("inputs").unwrap().collect();
        assert_eq!(inputs, vec![&PathBuf::from("a.mp4"), &PathBuf::from("b.mp4")]);
        assert!(matches.get_flag("no-scan"));
        assert_eq!(matches.get_one::<usize>("jobs"), Some(&2));
    }

    #[test]
    fn test_cli_rejects_verbose_with_quiet() {
        assert!(cli().try_get_matches_from(["ns3-trace-extractor", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_default_log_filter_scopes_debug_to_this_crate() {
        assert_eq!(default_log_filter(true), "ns3_trace_extractor=debug,info");
        assert_eq!(default_log_filter(false), "ns3_trace_extractor=info,warn");
        assert!(default_log_filter(true).parse::<EnvFilter>().is_ok());
    }
}
