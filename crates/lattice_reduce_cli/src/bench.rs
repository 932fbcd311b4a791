//! LLL Lattice Reduction Benchmark
//!
//! Times the floating reduction against the exact-products mode on random
//! and knapsack lattices, verifying every result.

use anyhow::{Context, Result};
use lattice_reduce_core::lattice::transform::is_unimodular;
use lattice_reduce_core::{GramSchmidtMode, LLLConfig, LatticeBasis, ReductionOutcome, LLL};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::time::Instant;

/// Results from a single LLL benchmark run
#[derive(Debug, Clone)]
pub struct LLLBenchResult {
    pub n: usize,
    pub bits: usize,
    pub approx_ms: f64,
    pub exact_ms: f64,
    pub speedup: f64,
    pub swaps: usize,
    pub escalations: usize,
    pub rank: usize,
    pub verified: bool,
}

/// Reduce a copy of `basis` with a transform; returns the outcome, the time
/// in milliseconds and whether the result checks out
fn timed_reduce(basis: &LatticeBasis, config: &LLLConfig) -> Result<(ReductionOutcome, f64, bool)> {
    let mut reduced = basis.clone();
    let mut transform = LatticeBasis::identity(basis.n);

    let start = Instant::now();
    let outcome = LLL::reduce_in_place(&mut reduced, Some(&mut transform), config)
        .with_context(|| format!("reduction of {}×{} basis failed", basis.n, basis.m))?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let verified = LLL::is_reduced_with_removal(&reduced, outcome.zeros, config)
        && transform.mul(basis)? == reduced
        && is_unimodular(&transform);
    Ok((outcome, elapsed_ms, verified))
}

fn benchmark_lll(basis: &LatticeBasis, bits: usize) -> Result<LLLBenchResult> {
    let approx_config = LLLConfig::default();
    let exact_config = LLLConfig {
        gram_schmidt: GramSchmidtMode::Exact,
        ..Default::default()
    };

    let (outcome, approx_ms, approx_ok) = timed_reduce(basis, &approx_config)?;
    let (_, exact_ms, exact_ok) = timed_reduce(basis, &exact_config)?;

    let speedup = if approx_ms > 0.001 { exact_ms / approx_ms } else { 0.0 };

    Ok(LLLBenchResult {
        n: basis.n,
        bits,
        approx_ms,
        exact_ms,
        speedup,
        swaps: outcome.stats.swaps,
        escalations: outcome.stats.escalations,
        rank: outcome.rank,
        verified: approx_ok && exact_ok,
    })
}

/// Run LLL benchmark comparing floating and exact scalar products
pub fn run_lll_benchmark(max_dim: usize, max_bits: usize, seed: u64, export: Option<&Path>) -> Result<()> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                LLL Lattice Reduction Benchmark               ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Max dimension: {}, Max bits: {}, seed: {}", max_dim, max_bits, seed);
    println!();

    // Test configurations: (n, bits)
    let configs: Vec<(usize, usize)> = vec![
        (4, 8),
        (8, 8),
        (10, 12),
        (15, 16),
        (20, 16),
        (25, 16),
        (30, 20),
        (40, 20),
        (40, 40),
        (50, 60),
    ]
    .into_iter()
    .filter(|&(n, b)| n <= max_dim && b <= max_bits)
    .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut results = Vec::new();

    println!("┌──────┬──────┬────────────┬────────────┬──────────┬────────────┬─────────────┬──────────┐");
    println!("│  n   │ bits │ Approx (ms)│ Exact (ms) │ Speedup  │   Swaps    │ Escalations │ Verified │");
    println!("├──────┼──────┼────────────┼────────────┼──────────┼────────────┼─────────────┼──────────┤");

    for &(n, bits) in &configs {
        let basis = LatticeBasis::random_with(&mut rng, n, n, bits);
        let result = benchmark_lll(&basis, bits)?;

        let verified_str = if result.verified { "✓" } else { "✗" };
        println!(
            "│ {:>4} │ {:>4} │ {:>10.2} │ {:>10.2} │ {:>7.2}× │ {:>10} │ {:>11} │    {}     │",
            n,
            bits,
            result.approx_ms,
            result.exact_ms,
            result.speedup,
            result.swaps,
            result.escalations,
            verified_str
        );

        results.push(result);
    }

    println!("└──────┴──────┴────────────┴────────────┴──────────┴────────────┴─────────────┴──────────┘");
    println!();

    if let Some(path) = export {
        export_lll_results(path, &results)?;
        println!("Results exported to: {}", path.display());
    }
    Ok(())
}

/// Export LLL benchmark results to CSV
fn export_lll_results(path: &Path, results: &[LLLBenchResult]) -> Result<()> {
    use std::fs::File;
    use std::io::Write;

    let mut file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    writeln!(file, "n,bits,approx_ms,exact_ms,speedup,swaps,escalations,rank,verified")?;

    for r in results {
        writeln!(
            file,
            "{},{},{:.6},{:.6},{:.6},{},{},{},{}",
            r.n, r.bits, r.approx_ms, r.exact_ms, r.speedup, r.swaps, r.escalations, r.rank, r.verified
        )?;
    }
    Ok(())
}

/// Knapsack lattice benchmark (cryptanalytic application)
pub fn run_knapsack_benchmark(max_n: usize, seed: u64) -> Result<()> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║         Knapsack Lattice LLL Benchmark (Cryptanalysis)       ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let configs: Vec<usize> = vec![4, 8, 12, 16, 20, 24, 28, 32]
        .into_iter()
        .filter(|&n| n <= max_n)
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);

    println!("┌──────┬────────────┬────────────┬──────────┬────────────┬────────────┬──────────┐");
    println!("│  n   │ Approx (ms)│ Exact (ms) │ Speedup  │   Swaps    │ Escalation │ Verified │");
    println!("├──────┼────────────┼────────────┼──────────┼────────────┼────────────┼──────────┤");

    for &n in &configs {
        // Random weights, target the sum of the first half
        let a: Vec<i64> = (0..n).map(|_| rng.gen_range(1..1_000_000)).collect();
        let s: i64 = a.iter().take(n / 2).sum();
        let basis = LatticeBasis::knapsack(&a, s);

        let result = benchmark_lll(&basis, 0)?;

        println!(
            "│ {:>4} │ {:>10.2} │ {:>10.2} │ {:>7.2}× │ {:>10} │ {:>10} │    {}     │",
            n,
            result.approx_ms,
            result.exact_ms,
            result.speedup,
            result.swaps,
            result.escalations,
            if result.verified { "✓" } else { "✗" }
        );
    }

    println!("└──────┴────────────┴────────────┴──────────┴────────────┴────────────┴──────────┘");
    Ok(())
}
