//! Lattice Reduce CLI
//!
//! LLL reduction of integer lattices given in the fplll matrix format.
//!
//! # Usage
//! ```bash
//! # Reduce a basis, printing the reduced rows and the transform
//! lattice-reduce reduce --input basis.txt --transform
//!
//! # Drop vectors whose squared Gram-Schmidt norm is below 100
//! lattice-reduce reduce --input basis.txt --removal-bound 100
//!
//! # Timing on random and knapsack lattices
//! lattice-reduce bench --max-dim 40 --export results.csv
//! ```

mod bench;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lattice_reduce_core::lattice::{gso, is_unimodular};
use lattice_reduce_core::{reduce, GramSchmidtMode, LLLConfig, LatticeBasis, LLL};
use log::{debug, info};
use num_bigint::BigInt;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lattice-reduce")]
#[command(about = "Floating-point LLL lattice reduction with vector removal")]
#[command(version)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ReductionArgs {
    /// Lovász parameter δ
    #[arg(long, default_value = "0.99")]
    delta: f64,

    /// Size-reduction parameter η
    #[arg(long, default_value = "0.51")]
    eta: f64,

    /// Use exact scalar products for every row
    #[arg(long)]
    exact: bool,

    /// Rows allowed to fail with floating products before they are disabled
    #[arg(long, default_value = "50")]
    fast_failure_limit: usize,
}

impl ReductionArgs {
    fn config(&self) -> LLLConfig {
        LLLConfig {
            delta: self.delta,
            eta: self.eta,
            gram_schmidt: if self.exact {
                GramSchmidtMode::Exact
            } else {
                GramSchmidtMode::Approx
            },
            fast_failure_limit: self.fast_failure_limit,
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// LLL-reduce a basis
    Reduce {
        /// Basis in fplll format; reads stdin when omitted or "-"
        #[arg(long)]
        input: Option<PathBuf>,

        /// Remove vectors whose squared Gram-Schmidt norm is below this bound
        #[arg(long)]
        removal_bound: Option<BigInt>,

        /// Also print the unimodular transform
        #[arg(long)]
        transform: bool,

        /// Leave removed vectors in the output (they are dropped by default)
        #[arg(long)]
        keep_removed: bool,

        #[command(flatten)]
        reduction: ReductionArgs,
    },

    /// Check whether a basis is LLL-reduced
    Verify {
        /// Basis in fplll format; reads stdin when omitted or "-"
        #[arg(long)]
        input: Option<PathBuf>,

        /// Number of leading rows to ignore
        #[arg(long, default_value = "0")]
        skip: usize,

        #[command(flatten)]
        reduction: ReductionArgs,
    },

    /// Orthonormalize the columns of a matrix with floating Gram-Schmidt
    Gso {
        /// Matrix in fplll format; reads stdin when omitted or "-"
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Time reduction of random lattices
    Bench {
        /// Maximum lattice dimension
        #[arg(long, default_value = "30")]
        max_dim: usize,

        /// Maximum entry bit size
        #[arg(long, default_value = "20")]
        max_bits: usize,

        /// Seed for the random lattices
        #[arg(long, default_value = "1")]
        seed: u64,

        /// Export results to CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Time reduction of knapsack lattices (cryptanalysis)
    KnapsackBench {
        /// Maximum knapsack size
        #[arg(long, default_value = "32")]
        max_n: usize,

        /// Seed for the knapsack weights
        #[arg(long, default_value = "1")]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Reduce {
            input,
            removal_bound,
            transform,
            keep_removed,
            reduction,
        } => run_reduce(
            input.as_deref(),
            removal_bound.as_ref(),
            transform,
            keep_removed,
            &reduction.config(),
        ),
        Commands::Verify {
            input,
            skip,
            reduction,
        } => run_verify(input.as_deref(), skip, &reduction.config()),
        Commands::Gso { input } => run_gso(input.as_deref()),
        Commands::Bench {
            max_dim,
            max_bits,
            seed,
            export,
        } => bench::run_lll_benchmark(max_dim, max_bits, seed, export.as_deref()),
        Commands::KnapsackBench { max_n, seed } => bench::run_knapsack_benchmark(max_n, seed),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn read_basis(input: Option<&Path>) -> Result<LatticeBasis> {
    let text = match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            text
        }
    };
    let basis = LatticeBasis::parse_fplll(&text).context("invalid basis")?;
    debug!("read {}×{} basis", basis.n, basis.m);
    Ok(basis)
}

fn run_reduce(
    input: Option<&Path>,
    removal_bound: Option<&BigInt>,
    with_transform: bool,
    keep_removed: bool,
    config: &LLLConfig,
) -> Result<()> {
    let mut basis = read_basis(input)?;
    let mut transform = with_transform.then(|| LatticeBasis::identity(basis.n));

    let outcome = reduce(&mut basis, transform.as_mut(), removal_bound, config)
        .context("reduction failed")?;
    info!(
        "rank {} ({} zero vectors, {} below bound removed)",
        outcome.rank, outcome.zero_vectors, outcome.removed_below_bound
    );

    let first = if keep_removed { 0 } else { outcome.zeros };
    if first == basis.n {
        bail!("every vector was removed");
    }

    let kept = LatticeBasis::new(basis.vectors[first..].to_vec());
    println!("{}", kept.to_fplll_string());

    if let Some(t) = transform {
        debug_assert!(is_unimodular(&t));
        let rows = LatticeBasis::new(t.vectors[first..].to_vec());
        println!("{}", rows.to_fplll_string());
    }
    Ok(())
}

fn run_verify(input: Option<&Path>, skip: usize, config: &LLLConfig) -> Result<()> {
    config.validate()?;
    let basis = read_basis(input)?;
    if skip > basis.n {
        bail!("cannot skip {} rows of a {}-row basis", skip, basis.n);
    }
    if LLL::is_reduced_with_removal(&basis, skip, config) {
        println!("reduced (delta = {}, eta = {})", config.delta, config.eta);
        Ok(())
    } else {
        bail!("not reduced (delta = {}, eta = {})", config.delta, config.eta)
    }
}

fn run_gso(input: Option<&Path>) -> Result<()> {
    let matrix = read_basis(input)?.to_f64_matrix()?;
    let q = gso(&matrix);
    for i in 0..q.rows() {
        let row: Vec<String> = q.row(i).iter().map(|x| format!("{:.12e}", x)).collect();
        println!("[{}]", row.join(" "));
    }
    Ok(())
}
