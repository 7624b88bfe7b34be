//! CLI entry point for the scaling-law estimation harness.
//!
//! # Usage
//!
//! ```bash
//! # Full default run: all three epistemic classes, records under ./results/
//! cargo run --release
//!
//! # Single imposed-exponent run with a custom exponent
//! cargo run --release -- imposed --alpha 1.0 --seeds 30
//!
//! # Inference-class run with the empirical LLR estimator
//! cargo run --release -- inference --method empirical --n-trials 5000
//!
//! # Robustness sweep over imposed exponents
//! cargo run --release -- alpha-sweep --alphas "0.0,0.3,0.6,1.0,1.5"
//!
//! # Inspect a persisted record (any supported shape)
//! cargo run --release -- show results/class1_inference.json
//! ```

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use serde_json::json;

use fluxfit::config::{log_grid, DEFAULT_N_BOOT, DEFAULT_N_MC, DEFAULT_RESULTS_DIR, DEFAULT_SEED};
use fluxfit::output::{load_record, ResultsDir};
use fluxfit::record::ScalingRecord;
use fluxfit::sim::fixed_point::{estimate_with_diag, FixedPointParams};
use fluxfit::sim::imposed::ImposedParams;
use fluxfit::sim::inference::{InferenceParams, LlrMethod};
use fluxfit::sim::meeting_point::{meeting_point_curve, optimal_time, Interferometer};
use fluxfit::sweep::{alpha_sweep, multi_seed_sweep, SweepConfig};
use fluxfit::{ResolutionEstimator, SeedSequence, SimError, SweepResult};

/// Monte Carlo scaling-law estimation for flux-resolution trade-offs
#[derive(Parser, Debug)]
#[command(name = "fluxfit")]
#[command(about = "Estimate resolution-vs-flux scaling exponents across epistemic classes")]
#[command(version)]
struct Cli {
    /// With no subcommand, runs all three classes at their defaults.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Class 0B: hard-coded exponent; pipeline validation only
    Imposed(ImposedArgs),
    /// Class 0A: self-consistent fixed-point construction
    FixedPoint(FixedPointArgs),
    /// Class 1: genuine inference via threshold search on the mean LLR
    Inference(InferenceArgs),
    /// Slope-recovery robustness sweep over imposed exponents
    AlphaSweep(AlphaSweepArgs),
    /// Meeting-point and optimal interrogation time analysis
    OptimalTime(OptimalTimeArgs),
    /// Print a summary of a persisted record
    Show {
        /// Path to a JSON record in any supported shape
        file: PathBuf,
    },
}

/// Arguments every scaling run shares.
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Base seed for the replication seed sequence
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Number of replicate seeds
    #[arg(long, default_value_t = 20)]
    seeds: usize,

    /// Output directory for JSON records
    #[arg(short, long, default_value = DEFAULT_RESULTS_DIR)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ImposedArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Anomalous exponent α (slope −1/(2+α) is baked in)
    #[arg(long, default_value_t = 0.6)]
    alpha: f64,

    /// Monte Carlo samples per flux point
    #[arg(long, default_value_t = DEFAULT_N_MC)]
    n_mc: usize,

    /// Bootstrap resamples for the slope CI
    #[arg(long, default_value_t = DEFAULT_N_BOOT)]
    n_boot: usize,

    /// Lowest flux of the grid
    #[arg(long, default_value_t = 1e1)]
    phi_min: f64,

    /// Highest flux of the grid
    #[arg(long, default_value_t = 1e4)]
    phi_max: f64,

    /// Number of flux points
    #[arg(long, default_value_t = 8)]
    n_phi: usize,
}

#[derive(Args, Debug)]
struct FixedPointArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Diffusion coefficient D
    #[arg(long, default_value_t = 1.0)]
    d: f64,

    /// Per-sample measurement noise σ_m
    #[arg(long, default_value_t = 1.0)]
    sigma_m: f64,

    /// Monte Carlo samples per flux point
    #[arg(long, default_value_t = DEFAULT_N_MC)]
    n_mc: usize,

    /// Fixed-point iterations per sample
    #[arg(long, default_value_t = 12)]
    n_iter: usize,

    /// Bootstrap resamples for the slope CI
    #[arg(long, default_value_t = 5_000)]
    n_boot: usize,

    /// Lowest flux of the grid
    #[arg(long, default_value_t = 1e1)]
    phi_min: f64,

    /// Highest flux of the grid
    #[arg(long, default_value_t = 1e4)]
    phi_max: f64,

    /// Number of flux points
    #[arg(long, default_value_t = 8)]
    n_phi: usize,
}

#[derive(Args, Debug)]
struct InferenceArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Diffusion coefficient D
    #[arg(long, default_value_t = 1e-12)]
    d: f64,

    /// Photon shot-noise scale σ_ph
    #[arg(long, default_value_t = 2e-7)]
    sigma_ph: f64,

    /// Observation window T_obs in the same time units as Δt
    #[arg(long, default_value_t = 5e-3)]
    t_obs: f64,

    /// Detection threshold D* on the mean log-likelihood ratio
    #[arg(long, default_value_t = 1.0)]
    d_star: f64,

    /// LLR trials per candidate Δt
    #[arg(long, default_value_t = 20_000)]
    n_trials: usize,

    /// LLR estimator: analytic-kl or empirical
    #[arg(long, default_value = "analytic-kl")]
    method: String,

    /// Bootstrap resamples for the slope CI
    #[arg(long, default_value_t = DEFAULT_N_BOOT)]
    n_boot: usize,

    /// Lowest flux of the grid
    #[arg(long, default_value_t = 5e4)]
    phi_min: f64,

    /// Highest flux of the grid
    #[arg(long, default_value_t = 5e7)]
    phi_max: f64,

    /// Number of flux points
    #[arg(long, default_value_t = 12)]
    n_phi: usize,
}

#[derive(Args, Debug)]
struct AlphaSweepArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Imposed exponents to test (comma-separated)
    #[arg(long, default_value = "0.0,0.3,0.6,1.0,1.5")]
    alphas: String,

    /// Monte Carlo samples per flux point
    #[arg(long, default_value_t = DEFAULT_N_MC)]
    n_mc: usize,

    /// Replicate seeds per exponent
    #[arg(long, default_value_t = 8)]
    n_rep: usize,

    /// Bootstrap resamples for the slope CI
    #[arg(long, default_value_t = 5_000)]
    n_boot: usize,
}

#[derive(Args, Debug)]
struct OptimalTimeArgs {
    /// Dephasing rates γ to scan (comma-separated)
    #[arg(long, default_value = "1.0,10.0,100.0")]
    gammas: String,

    /// Fisher information rate r of the underlying readout
    #[arg(long, default_value_t = 1.0)]
    rate: f64,

    /// Detection threshold D*
    #[arg(long, default_value_t = 1.0)]
    d_star: f64,

    /// Interferometer visibility V
    #[arg(long, default_value_t = 1.0)]
    visibility: f64,

    /// Number of points on the log-spaced time grid
    #[arg(long, default_value_t = 400)]
    n_grid: usize,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        None => run_default(),
        Some(Command::Imposed(args)) => run_imposed(&args),
        Some(Command::FixedPoint(args)) => run_fixed_point(&args),
        Some(Command::Inference(args)) => run_inference(&args),
        Some(Command::AlphaSweep(args)) => run_alpha_sweep(&args),
        Some(Command::OptimalTime(args)) => run_optimal_time(&args),
        Some(Command::Show { file }) => run_show(&file),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn sweep_config(common: &CommonArgs, n_boot: usize, min_fit_points: usize) -> SweepConfig {
    SweepConfig::new()
        .n_seeds(common.seeds)
        .base_seed(common.seed)
        .n_boot(n_boot)
        .min_fit_points(min_fit_points)
}

fn print_summary(record: &ScalingRecord) {
    println!("class:          {}", record.class);
    println!("model:          {}", record.model);
    match record.slope_mean {
        Some(mean) => {
            let std = record.slope_std.unwrap_or(0.0);
            println!(
                "fitted slope:   {mean:+.4} ± {std:.4} ({} valid seeds)",
                record.n_valid_seeds
            );
        }
        None => println!("fitted slope:   unavailable (no valid seeds)"),
    }
    if let Some([lo, hi]) = record.slope_ci95_mean {
        println!("95% CI (mean):  [{lo:+.4}, {hi:+.4}]");
    } else if !record.reliable {
        println!("95% CI (mean):  omitted (fewer than 5 valid seeds)");
    }
    if let Some(expected) = record.expected_slope {
        println!("expected slope: {expected:+.4}");
    }
    for note in &record.notes {
        println!("note: {note}");
    }
    println!();
}

fn finish_run(
    out: &PathBuf,
    name: &str,
    sweep: &SweepResult,
    estimator: &dyn ResolutionEstimator,
) -> Result<ScalingRecord, SimError> {
    let record = ScalingRecord::from_sweep(sweep, estimator.params_json(), Vec::new());
    ResultsDir::new(out.clone()).save(name, &record)?;
    print_summary(&record);
    Ok(record)
}

/// The reproducible default run: all three classes at their canonical
/// parameters, one record each.
fn run_default() -> Result<(), SimError> {
    let common = CommonArgs {
        seed: DEFAULT_SEED,
        seeds: 20,
        out: PathBuf::from(DEFAULT_RESULTS_DIR),
    };

    run_imposed(&ImposedArgs {
        common: common.clone(),
        alpha: 0.6,
        n_mc: DEFAULT_N_MC,
        n_boot: DEFAULT_N_BOOT,
        phi_min: 1e1,
        phi_max: 1e4,
        n_phi: 8,
    })?;

    run_fixed_point(&FixedPointArgs {
        common: common.clone(),
        d: 1.0,
        sigma_m: 1.0,
        n_mc: DEFAULT_N_MC,
        n_iter: 12,
        n_boot: 5_000,
        phi_min: 1e1,
        phi_max: 1e4,
        n_phi: 8,
    })?;

    run_inference(&InferenceArgs {
        common,
        d: 1e-12,
        sigma_ph: 2e-7,
        t_obs: 5e-3,
        d_star: 1.0,
        n_trials: 20_000,
        method: "analytic-kl".into(),
        n_boot: DEFAULT_N_BOOT,
        phi_min: 5e4,
        phi_max: 5e7,
        n_phi: 12,
    })
}

fn run_imposed(args: &ImposedArgs) -> Result<(), SimError> {
    let params = ImposedParams::new(args.alpha).n_mc(args.n_mc);
    let grid = log_grid(args.phi_min, args.phi_max, args.n_phi);
    let sweep = multi_seed_sweep(&params, &grid, &sweep_config(&args.common, args.n_boot, 2))?;
    finish_run(&args.common.out, "class0b_imposed.json", &sweep, &params)?;
    Ok(())
}

fn run_fixed_point(args: &FixedPointArgs) -> Result<(), SimError> {
    let params = FixedPointParams::new()
        .d(args.d)
        .sigma_m(args.sigma_m)
        .n_mc(args.n_mc)
        .n_iter(args.n_iter);
    let grid = log_grid(args.phi_min, args.phi_max, args.n_phi);
    let sweep = multi_seed_sweep(&params, &grid, &sweep_config(&args.common, args.n_boot, 2))?;

    // One diagnostic pass at the densest flux to record the effective
    // rates the closure converged onto.
    let mut diag_rng = SeedSequence::new(args.common.seed).stream(0);
    let (_, diags) = estimate_with_diag(args.phi_max, &params, &mut diag_rng)?;
    let lam_last: Vec<f64> = diags.iter().take(16).map(|d| d.lam_last).collect();

    let mut record = ScalingRecord::from_sweep(&sweep, params.params_json(), Vec::new());
    record.diagnostics = json!({ "phi": args.phi_max, "lam_last_head": lam_last });
    ResultsDir::new(args.common.out.clone()).save("class0a_fixed_point.json", &record)?;
    print_summary(&record);
    Ok(())
}

fn parse_method(text: &str) -> LlrMethod {
    match text.to_lowercase().as_str() {
        "analytic-kl" | "analytic_kl" | "analytic" => LlrMethod::AnalyticKl,
        "empirical" => LlrMethod::Empirical,
        other => {
            eprintln!("Unknown LLR method '{other}'. Available: analytic-kl, empirical");
            process::exit(1);
        }
    }
}

fn run_inference(args: &InferenceArgs) -> Result<(), SimError> {
    let params = InferenceParams::new()
        .d(args.d)
        .sigma_ph(args.sigma_ph)
        .t_obs(args.t_obs)
        .d_star(args.d_star)
        .n_trials(args.n_trials)
        .method(parse_method(&args.method));
    let grid = log_grid(args.phi_min, args.phi_max, args.n_phi);
    let sweep = multi_seed_sweep(&params, &grid, &sweep_config(&args.common, args.n_boot, 5))?;
    finish_run(&args.common.out, "class1_inference.json", &sweep, &params)?;
    Ok(())
}

fn parse_f64_list(text: &str) -> Vec<f64> {
    text.split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}

fn run_alpha_sweep(args: &AlphaSweepArgs) -> Result<(), SimError> {
    let alphas = parse_f64_list(&args.alphas);
    if alphas.is_empty() {
        eprintln!("No parsable exponents in {:?}", args.alphas);
        process::exit(1);
    }
    let grid = log_grid(1e1, 1e4, 8);
    let rows = alpha_sweep(
        &alphas,
        &grid,
        args.n_mc,
        args.n_rep,
        args.common.seed,
        args.n_boot,
    )?;

    println!("{:>6}  {:>9}  {:>9}  {:>8}  {:>5}", "alpha", "expected", "fitted", "std", "seeds");
    for row in &rows {
        let fitted = row
            .aggregate
            .mean
            .map_or("n/a".to_string(), |m| format!("{m:+.4}"));
        let std = row
            .aggregate
            .std
            .map_or("n/a".to_string(), |s| format!("{s:.4}"));
        println!(
            "{:>6.2}  {:>+9.4}  {:>9}  {:>8}  {:>5}",
            row.alpha, row.expected, fitted, std, row.aggregate.n_valid
        );
    }
    Ok(())
}

fn run_optimal_time(args: &OptimalTimeArgs) -> Result<(), SimError> {
    let gammas = parse_f64_list(&args.gammas);
    if gammas.is_empty() {
        eprintln!("No parsable rates in {:?}", args.gammas);
        process::exit(1);
    }

    let times = log_grid(1e-4, 1e2, args.n_grid);
    let curve = meeting_point_curve(Interferometer::Ramsey, &times, args.visibility, args.d_star);
    let crossings = curve
        .times
        .windows(2)
        .zip(curve.delta_inf.windows(2).zip(curve.delta_dyn.windows(2)))
        .filter(|(_, (inf, dyn_))| (inf[0] - dyn_[0]).signum() != (inf[1] - dyn_[1]).signum())
        .count();
    println!(
        "meeting point: {} crossing(s) of δ_inf and δ_dyn over t ∈ [1e-4, 1e2]",
        crossings
    );

    println!("{:>10}  {:>12}  {:>12}  {:>12}", "gamma", "t*", "I(t*)", "delta*");
    for &gamma in &gammas {
        let opt = optimal_time(gamma, &times, args.rate, args.d_star);
        println!(
            "{:>10.3}  {:>12.5e}  {:>12.5e}  {:>12.5e}",
            gamma, opt.t_star, opt.i_star, opt.delta_star
        );
    }
    Ok(())
}

fn run_show(file: &PathBuf) -> Result<(), SimError> {
    let record = load_record(file)?;
    println!("file:           {}", file.display());
    println!("schema version: {}", record.schema_version);
    println!("flux points:    {}", record.phi.len());
    println!("seed curves:    {}", record.seed_curves.len());
    print_summary(&record);
    Ok(())
}
