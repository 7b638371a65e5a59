// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk: synthetic capture degradations for screenshot datasets.
//
// Entry point. Initialises logging, parses the command line, and runs either
// a directory batch or a single image. Item failures are reported in the
// summary; only an invalid invocation changes the exit code.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use rand::SeedableRng;
use rand::rngs::StdRng;
use scanwerk_batch::{
    BatchOrchestrator, DirectorySink, SingleImageJob, augment_one, data_dir, discover_sources,
};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::{AugmentConfig, EffectKind, Intensity, PaperSize, RunMode};

/// Exit code for invalid invocations (bad arguments, config or directories).
const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let matches = cli().get_matches();
    let outcome = match matches.subcommand() {
        Some(("run", args)) => run_batch(args),
        Some(("one", args)) => run_single(args),
        _ => Err(ScanwerkError::InvalidConfig("no subcommand given".into())),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Invocation failed");
            eprintln!("scanwerk: {err}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn cli() -> Command {
    let paper = Arg::new("paper")
        .long("paper")
        .value_parser(|s: &str| s.parse::<PaperSize>().map_err(|e| e.to_string()))
        .help("Page size: a4, a3, a5, letter, legal or WIDTHxHEIGHT in mm");
    let seed = Arg::new("seed")
        .long("seed")
        .value_parser(value_parser!(u64))
        .help("Base seed for a reproducible run");

    Command::new("scanwerk")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Degrade screenshots into scanner, phone-camera and photocopy PDF pages")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Augment every image in a directory")
                .arg(
                    Arg::new("input_dir")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory of png/jpg/jpeg screenshots"),
                )
                .arg(
                    Arg::new("output_dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Artifact directory (default: <data dir>/scanwerk/augmented)"),
                )
                .arg(
                    Arg::new("single-random")
                        .long("single-random")
                        .action(ArgAction::SetTrue)
                        .help("Apply one randomly chosen effect per image"),
                )
                .arg(seed.clone())
                .arg(
                    Arg::new("workers")
                        .long("workers")
                        .value_parser(value_parser!(usize))
                        .help("Worker threads (1 = sequential)"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON config file; flags override its fields"),
                )
                .arg(paper.clone())
                .arg(
                    Arg::new("summary-json")
                        .long("summary-json")
                        .value_parser(value_parser!(PathBuf))
                        .help("Also write the run summary as JSON to this file"),
                )
                .arg(
                    Arg::new("no-manifest")
                        .long("no-manifest")
                        .action(ArgAction::SetTrue)
                        .help("Do not write manifest.jsonl"),
                ),
        )
        .subcommand(
            Command::new("one")
                .about("Augment a single image")
                .arg(
                    Arg::new("image")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("effect")
                        .long("effect")
                        .value_parser(|s: &str| s.parse::<EffectKind>().map_err(|e| e.to_string()))
                        .help("scanner, phone or photocopy (default: all three)"),
                )
                .arg(
                    Arg::new("intensity")
                        .long("intensity")
                        .value_parser(|s: &str| {
                            s.parse::<f32>()
                                .map_err(|e| e.to_string())
                                .and_then(|v| Intensity::new(v).map_err(|e| e.to_string()))
                        })
                        .help("Fixed intensity (default: sampled from 0.5..=1.5)"),
                )
                .arg(
                    Arg::new("output_dir")
                        .long("output-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Where to write artifacts (default: next to the image)"),
                )
                .arg(seed)
                .arg(paper),
        )
}

/// Build the run config: file (if any), then flag overrides.
fn batch_config(args: &ArgMatches) -> Result<AugmentConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => AugmentConfig::load(path)?,
        None => AugmentConfig::default(),
    };
    if args.get_flag("single-random") {
        config.mode = RunMode::SingleRandom;
    }
    if let Some(seed) = args.get_one::<u64>("seed") {
        config.seed = Some(*seed);
    }
    if let Some(workers) = args.get_one::<usize>("workers") {
        config.workers = *workers;
    }
    if let Some(paper) = args.get_one::<PaperSize>("paper") {
        config.paper_size = *paper;
    }
    if args.get_flag("no-manifest") {
        config.write_manifest = false;
    }
    config.validate()?;
    Ok(config)
}

fn run_batch(args: &ArgMatches) -> Result<()> {
    let config = batch_config(args)?;
    let input_dir = args
        .get_one::<PathBuf>("input_dir")
        .cloned()
        .ok_or_else(|| ScanwerkError::InvalidConfig("input directory is required".into()))?;
    let output_dir = args
        .get_one::<PathBuf>("output_dir")
        .cloned()
        .unwrap_or_else(data_dir::default_output_dir);

    let sources = discover_sources(&input_dir)?;
    let sink = DirectorySink::create(&output_dir)?;
    tracing::info!(
        input = %input_dir.display(),
        output = %output_dir.display(),
        images = sources.len(),
        "Starting batch"
    );

    let report = BatchOrchestrator::new(config)?.run(&sources, &sink);

    println!("{}", report.summary);
    println!("Output:             {}", output_dir.display());

    if let Some(path) = args.get_one::<PathBuf>("summary-json") {
        let json = serde_json::to_string_pretty(&report.summary)?;
        if let Err(err) = std::fs::write(path, json) {
            tracing::warn!(path = %path.display(), error = %err, "Could not write summary JSON");
        }
    }
    Ok(())
}

fn run_single(args: &ArgMatches) -> Result<()> {
    let image = args
        .get_one::<PathBuf>("image")
        .cloned()
        .ok_or_else(|| ScanwerkError::InvalidConfig("image path is required".into()))?;

    let mut job = SingleImageJob::new(&image);
    job.effect = args.get_one::<EffectKind>("effect").copied();
    job.intensity = args.get_one::<Intensity>("intensity").copied();
    if let Some(paper) = args.get_one::<PaperSize>("paper") {
        job.paper_size = *paper;
    }

    let output_dir = match args.get_one::<PathBuf>("output_dir") {
        Some(dir) => dir.clone(),
        None => image
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let sink = DirectorySink::create(&output_dir)?;

    let mut rng = match args.get_one::<u64>("seed") {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_os_rng(),
    };

    let entries = augment_one(&job, &sink, &mut rng)?;
    for entry in entries {
        println!(
            "{}  {} intensity {}  {:.1} KB",
            output_dir.join(&entry.artifact).display(),
            entry.effect,
            entry.intensity,
            entry.bytes as f64 / 1024.0
        );
    }
    Ok(())
}
