use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::level_filters::LevelFilter;

use atom_mapping::{
    check_compatible,
    loader::{self, BondInference},
    search, Mapping,
};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum Format {
    /// One `index: {reference: target, ...}` line per mapping.
    Text,
    /// One `mapping,reference,target,cost` row per atom pair.
    Csv,
}

/// Find all optimal atom mappings between two molecules.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Reference molecule (.xyz, .mol or .sdf).
    reference: PathBuf,

    /// Molecule to map onto the reference (.xyz, .mol or .sdf).
    target: PathBuf,

    /// First mapping pair as `REFERENCE_ATOM,TARGET_ATOM` (0-based).
    #[arg(short, long, value_parser = parse_seed)]
    seed: Option<(usize, usize)>,

    /// Slack in Ångström added to covalent radii when inferring XYZ bonds.
    #[arg(long, default_value_t = BondInference::default().tolerance)]
    tolerance: f64,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Print both molecules as Graphviz DOT instead of mapping them.
    #[arg(long)]
    dot: bool,

    /// Log more (repeat for more detail).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print nothing but the mappings.
    #[arg(short, long)]
    quiet: bool,
}

fn parse_seed(s: &str) -> Result<(usize, usize), String> {
    let (r, t) = s
        .split_once(',')
        .ok_or_else(|| format!("expected REFERENCE_ATOM,TARGET_ATOM, got {s:?}"))?;
    let atom = |x: &str| {
        x.trim()
            .parse::<usize>()
            .map_err(|e| format!("bad atom number {x:?}: {e}"))
    };
    Ok((atom(r)?, atom(t)?))
}

fn init_logging(cli: &Cli) {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn write_text(mappings: &[Mapping]) -> Result<()> {
    let mut out = io::stdout().lock();
    for (i, mapping) in mappings.iter().enumerate() {
        writeln!(out, "{}: {mapping}", i + 1)?;
    }
    Ok(())
}

fn write_csv(mappings: &[Mapping]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    writer.write_record(["mapping", "reference", "target", "cost"])?;
    for (i, mapping) in mappings.iter().enumerate() {
        for (r, t) in mapping.iter() {
            writer.write_record(&[
                (i + 1).to_string(),
                r.to_string(),
                t.to_string(),
                mapping.cost().to_string(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let inference = BondInference {
        tolerance: cli.tolerance,
    };
    let reference = loader::parse(&cli.reference, &inference)
        .with_context(|| format!("failed to load {}", cli.reference.display()))?;
    let target = loader::parse(&cli.target, &inference)
        .with_context(|| format!("failed to load {}", cli.target.display()))?;

    if cli.dot {
        println!("{}", reference.info());
        println!("{}", target.info());
        return Ok(());
    }

    check_compatible(&reference, &target).with_context(|| {
        format!(
            "cannot map {} ({}) onto {} ({})",
            cli.reference.display(),
            reference.formula(),
            cli.target.display(),
            target.formula()
        )
    })?;

    let Some(seed) = cli.seed else {
        bail!("--seed REFERENCE_ATOM,TARGET_ATOM is required to map atoms");
    };

    let quiet = cli.quiet;
    let outcome = search(&reference, &target, seed, |found| {
        if !quiet {
            eprint!("\r{found} possible mappings");
        }
    })
    .context("atom mapping failed")?;
    if !quiet && !outcome.mappings.is_empty() {
        eprintln!();
    }

    match cli.format {
        Format::Text => write_text(&outcome.mappings),
        Format::Csv => write_csv(&outcome.mappings),
    }
}
