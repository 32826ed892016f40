//! Train a hypersphere classifier on a delimited dataset and report how well
//! it recognizes a held-out split.
//!
//! ```text
//! import → normalize → random split → unit root → spawn until stable → evaluate
//! ```
//!
//! ## Usage
//!
//! ```text
//! cargo run -p rhc-testbed --release -- data/iris.data --train-fraction 0.8 --seed 7
//! RUST_LOG=rhc_sphere=debug cargo run -p rhc-testbed -- data/iris.data --lda childless
//! ```

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use rhc_core::parallel::available_threads;
use rhc_core::{feature_ranges, normalize, LabeledVector, Measure, SplitMix64};
use rhc_data::{random_partition, Importer, LabelColumn};
use rhc_sphere::{
    train, CollisionStrategy, Concurrency, LdaPolicy, SpawnOptions, SpawnRule, Sphere,
    TrainingLimits,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// CLI arguments for the testbed.
#[derive(Parser, Debug)]
#[command(name = "rhc-testbed")]
#[command(about = "Train and validate a recursive hypersphere classifier")]
struct Args {
    /// Delimited dataset, one labeled vector per line.
    path: PathBuf,

    /// Field delimiter.
    #[arg(long, default_value = ",")]
    delimiter: String,

    /// Header lines to skip.
    #[arg(long, default_value = "0")]
    skip_rows: usize,

    /// The label is in the first column instead of the last.
    #[arg(long)]
    label_first: bool,

    /// 0-based columns to ignore, comma separated.
    #[arg(long, value_delimiter = ',')]
    discard: Vec<usize>,

    /// Fraction of the data used for training; the rest is validation.
    #[arg(long, default_value = "0.8")]
    train_fraction: f64,

    /// euclidean | squared-euclidean | minkowski:<order>
    #[arg(long, default_value = "squared-euclidean")]
    measure: Measure,

    /// centroid | minimal | different-label | exploding
    #[arg(long, default_value = "centroid")]
    rule: SpawnRule,

    /// closest | furthest | random
    #[arg(long, default_value = "closest")]
    collision: CollisionStrategy,

    /// Enable discriminants: childless | always
    #[arg(long)]
    lda: Option<LdaPolicy>,

    /// Grow the root's children on parallel threads.
    #[arg(long)]
    parallel: bool,

    /// Seed for the split and for random collisions.
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Keep features as imported.
    #[arg(long)]
    no_normalize: bool,

    #[arg(long, default_value = "1000000")]
    max_spheres: usize,

    #[arg(long, default_value = "10000")]
    max_passes: usize,

    /// Dump the trained tree to stdout.
    #[arg(long)]
    hierarchy: bool,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Outcome of one testbed run.
#[derive(Debug, Clone, PartialEq)]
struct Summary {
    training: usize,
    validation: usize,
    spheres: usize,
    height: usize,
    discriminants: usize,
    passes: usize,
    converged: bool,
    correct: usize,
    accuracy: f64,
}

impl Args {
    fn spawn_options(&self) -> SpawnOptions {
        SpawnOptions {
            rule: self.rule,
            collision: self.collision,
            concurrency: if self.parallel {
                Concurrency::Parallel
            } else {
                Concurrency::Sequential
            },
            lda: self.lda,
        }
    }

    fn limits(&self) -> TrainingLimits {
        TrainingLimits {
            max_spheres: self.max_spheres,
            max_passes: self.max_passes,
        }
    }
}

fn load(args: &Args) -> anyhow::Result<Vec<LabeledVector<String>>> {
    let file = File::open(&args.path)
        .with_context(|| format!("opening {}", args.path.display()))?;
    let vectors = Importer::new()
        .delimiter(args.delimiter.as_str())
        .skip_rows(args.skip_rows)
        .label_column(if args.label_first {
            LabelColumn::First
        } else {
            LabelColumn::Last
        })
        .discard_columns(args.discard.iter().copied())
        .import(BufReader::new(file))
        .with_context(|| format!("importing {}", args.path.display()))?;
    Ok(vectors)
}

fn run(args: &Args, mut vectors: Vec<LabeledVector<String>>) -> anyhow::Result<Summary> {
    if vectors.is_empty() {
        bail!("dataset is empty");
    }
    if !(0.0..=1.0).contains(&args.train_fraction) {
        bail!("train fraction must lie in [0, 1], got {}", args.train_fraction);
    }

    if !args.no_normalize {
        let constant: Vec<usize> = feature_ranges(&vectors)?
            .iter()
            .enumerate()
            .filter(|(_, (min, max))| min == max)
            .map(|(i, _)| i)
            .collect();
        if !constant.is_empty() {
            warn!(?constant, "constant features normalize to NaN");
        }
        normalize(&mut vectors)?;
    }

    let mut rng = SplitMix64::new(args.seed);
    let first = (vectors.len() as f64 * args.train_fraction).round() as usize;
    let (training, validation) = random_partition(&vectors, first, &mut rng)?;
    let Some(seed_vector) = training.first() else {
        bail!("training split is empty");
    };
    info!(
        training = training.len(),
        validation = validation.len(),
        rank = seed_vector.rank(),
        "dataset split"
    );

    let measure = args.measure.build()?;
    let mut root = Sphere::unit(&*measure, seed_vector.rank(), seed_vector.label.clone());

    let options = args.spawn_options();
    if options.concurrency == Concurrency::Parallel {
        info!(threads = available_threads(), "parallel spawning");
    }
    let started = Instant::now();
    let report = train(
        &mut root,
        &training,
        &*measure,
        &options,
        &args.limits(),
        &mut rng,
    )?;
    info!(
        spheres = report.sphere_count,
        height = report.height,
        passes = report.passes(),
        converged = report.converged,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "training done"
    );

    if args.hierarchy {
        root.write_hierarchy_with_counts(&mut io::stdout().lock(), &training, &*measure)?;
    }

    let eval = root.evaluate(&validation, &*measure)?;
    Ok(Summary {
        training: training.len(),
        validation: validation.len(),
        spheres: report.sphere_count,
        height: report.height,
        discriminants: report.discriminants,
        passes: report.passes(),
        converged: report.converged,
        correct: eval.correct,
        accuracy: eval.accuracy(),
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).with_target(false).init();

    let vectors = load(&args)?;
    info!(vectors = vectors.len(), path = %args.path.display(), "imported");

    let summary = run(&args, vectors)?;
    println!("Training vectors:   {}", summary.training);
    println!("Validation vectors: {}", summary.validation);
    println!(
        "Spheres:            {} (height {}, {} discriminants)",
        summary.spheres, summary.height, summary.discriminants
    );
    println!(
        "Passes:             {}{}",
        summary.passes,
        if summary.converged { "" } else { " (limit reached)" }
    );
    println!(
        "Accuracy:           {}/{} = {:.2}%",
        summary.correct,
        summary.validation,
        summary.accuracy * 100.0
    );
    Ok(())
}
