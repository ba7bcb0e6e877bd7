use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use minmax_search::{
    BuildMode, LinearSearch, MinMaxSearch, Strategy, StrategyKind, TreeConfig,
    DEFAULT_LINEAR_THRESHOLD,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "minmax-search", about = "Range min/max search for large signals")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a synthetic signal into pixel columns and report timings.
    Bench {
        /// Number of samples in the synthetic signal.
        #[arg(long, default_value_t = 1_000_000)]
        samples: usize,
        /// Number of pixel columns to render.
        #[arg(long, default_value_t = 1920)]
        columns: usize,
        /// Search strategy.
        #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
        strategy: StrategyArg,
        /// Signals this short or shorter use a linear scan under `auto`.
        #[arg(long, default_value_t = DEFAULT_LINEAR_THRESHOLD)]
        linear_threshold: usize,
        /// Build the tree on a worker thread and start rendering immediately.
        #[arg(long)]
        background: bool,
        /// Check every column against a linear scan.
        #[arg(long)]
        verify: bool,
    },
    /// Query the min/max of an inclusive index range of a sample file.
    Query {
        /// Whitespace-separated samples.
        input: PathBuf,
        /// First index (inclusive).
        l: usize,
        /// Last index (inclusive).
        r: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Auto,
    Linear,
    Tree,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Bench {
            samples,
            columns,
            strategy,
            linear_threshold,
            background,
            verify,
        } => {
            let build_mode = if background {
                BuildMode::Background
            } else {
                BuildMode::Blocking
            };
            let config = TreeConfig::default()
                .with_build_mode(build_mode)
                .with_linear_threshold(linear_threshold);
            run_bench(samples, columns, strategy, config, verify)?
        }
        Commands::Query { input, l, r } => run_query(input, l, r)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_bench(
    samples: usize,
    columns: usize,
    strategy: StrategyArg,
    config: TreeConfig,
    verify: bool,
) -> Result<()> {
    if samples == 0 || columns == 0 {
        bail!("samples and columns must both be positive");
    }
    config.validate().context("invalid configuration")?;

    let signal = synthesize(samples);
    let reference = if verify {
        Some(LinearSearch::new(signal.clone()).context("failed to index reference signal")?)
    } else {
        None
    };

    let started = Instant::now();
    let search = match strategy {
        StrategyArg::Auto => Strategy::choose(signal, &config),
        StrategyArg::Linear => Strategy::with_kind(StrategyKind::Linear, signal, &config),
        StrategyArg::Tree => Strategy::with_kind(StrategyKind::Tree, signal, &config),
    }
    .context("failed to build search strategy")?;
    let build_time = started.elapsed();
    info!(
        kind = ?search.kind(),
        ready = search.is_ready(),
        build_ms = millis(build_time),
        "strategy built"
    );

    let started = Instant::now();
    let pixels = render_columns(&search, columns);
    let render_time = started.elapsed();

    if let Some(reference) = &reference {
        let expected = render_columns(reference, columns);
        let mismatches = pixels
            .iter()
            .zip(&expected)
            .filter(|(got, want)| got != want)
            .count();
        if mismatches > 0 {
            bail!("{mismatches} of {} columns differ from the linear scan", pixels.len());
        }
        info!(columns = pixels.len(), "all columns match the linear scan");
    }

    println!(
        "strategy={:?}\tsamples={}\tcolumns={}\tbuild={:.3}ms\trender={:.3}ms\tper_column={:.3}us",
        search.kind(),
        samples,
        pixels.len(),
        millis(build_time),
        millis(render_time),
        render_time.as_secs_f64() * 1e6 / pixels.len() as f64
    );

    Ok(())
}

/// One query per pixel column, non-overlapping and left to right.
fn render_columns<S: MinMaxSearch<f64>>(search: &S, columns: usize) -> Vec<(f64, f64)> {
    let len = search.len();
    let columns = columns.min(len);
    (0..columns)
        .map(|col| {
            let l = col * len / columns;
            let r = (col + 1) * len / columns - 1;
            search.query_range(l, r)
        })
        .collect()
}

/// Deterministic test signal: two sines plus a slow sawtooth.
fn synthesize(samples: usize) -> Vec<f64> {
    (0..samples)
        .map(|i| {
            let t = i as f64;
            (t / 50.0).sin() + 0.3 * (t / 7.0).sin() + (i % 10_000) as f64 / 10_000.0
        })
        .collect()
}

fn run_query(input: PathBuf, l: usize, r: usize) -> Result<()> {
    let samples = read_samples(&input)
        .with_context(|| format!("failed to read samples from {}", input.display()))?;
    if l > r || r >= samples.len() {
        bail!(
            "range [{l}, {r}] is outside the {} samples in {}",
            samples.len(),
            input.display()
        );
    }
    debug!(samples = samples.len(), "samples loaded");

    let search = Strategy::choose(samples, &TreeConfig::default())
        .context("failed to index samples")?;
    let (low, high) = search.query_range(l, r);
    println!("{low}\t{high}");
    Ok(())
}

fn read_samples(path: &Path) -> Result<Vec<f64>> {
    let contents = std::fs::read_to_string(path)?;
    contents
        .split_whitespace()
        .enumerate()
        .map(|(idx, token)| {
            token
                .parse::<f64>()
                .with_context(|| format!("invalid sample '{token}' at position {idx}"))
        })
        .collect()
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1e3
}
