//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs the requested workflow (see `pipeline`)
//! - prints reports and writes optional exports

use clap::Parser;
use log::{LevelFilter, info, warn};

use crate::cli::{Cli, Command, DrawArgs, EvalArgs, GridArgs, LoglikeArgs, PriorsArgs, SimulateArgs};
use crate::domain::{DrawConfig, FreqGrid, SimulateConfig};
use crate::error::AppError;

pub mod pipeline;

/// Environment variable supplying a default RNG seed.
pub const SEED_ENV: &str = "QUFIT_SEED";

const DEFAULT_SEED: u64 = 42;

/// Entry point for the `qufit` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env file is the normal case.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    setup_logging(cli.verbosity)
        .map_err(|e| AppError::new(4, format!("Failed to initialise logging: {e}")))?;

    match cli.command {
        Command::Models => {
            print!("{}", crate::report::format_model_list());
            Ok(())
        }
        Command::Priors(args) => handle_priors(args),
        Command::Eval(args) => handle_eval(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::Draw(args) => handle_draw(args),
        Command::Loglike(args) => handle_loglike(args),
    }
}

/// Activate a logger on stderr, so that stdout only carries results.
/// `RUST_LOG` is honoured; `-v` flags raise the level. Source lines are
/// shown when verbosity >= 3.
fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stderr);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(LevelFilter::Info),
        1 => builder.filter_level(LevelFilter::Debug),
        2 => builder.filter_level(LevelFilter::Trace),
        _ => {
            builder.filter_level(LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.try_init()
}

/// Resolve the RNG seed: explicit flag, then `QUFIT_SEED`, then the default.
pub fn resolve_seed(flag: Option<u64>) -> Result<u64, AppError> {
    if let Some(seed) = flag {
        return Ok(seed);
    }
    match std::env::var(SEED_ENV) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            AppError::new(2, format!("{SEED_ENV} must be an unsigned integer (got '{raw}')."))
        }),
        Err(_) => Ok(DEFAULT_SEED),
    }
}

fn freq_grid_from_args(args: &GridArgs) -> FreqGrid {
    FreqGrid {
        freq_min_hz: args.freq_min,
        freq_max_hz: args.freq_max,
        n_chan: args.n_chan,
    }
}

/// The written `dq`/`du` columns equal the noise level, and ingest rejects
/// non-positive errors, so the CLI requires `--noise > 0`.
pub fn simulate_config_from_args(args: &SimulateArgs) -> Result<SimulateConfig, AppError> {
    if !(args.noise > 0.0) {
        return Err(AppError::new(
            2,
            format!("--noise must be > 0 so the written dq/du columns can be scored (got {}).", args.noise),
        ));
    }
    Ok(SimulateConfig {
        model: args.model,
        params: pipeline::load_params(args.model, &args.params)?,
        grid: freq_grid_from_args(&args.grid),
        noise: args.noise,
        seed: resolve_seed(args.seed)?,
    })
}

pub fn draw_config_from_args(args: &DrawArgs) -> Result<DrawConfig, AppError> {
    Ok(DrawConfig {
        model: args.model,
        n_draws: args.n_draws,
        seed: resolve_seed(args.seed)?,
        export: args.export.clone(),
    })
}

fn handle_priors(args: PriorsArgs) -> Result<(), AppError> {
    let priors = crate::models::priors(args.model);
    priors.validate()?;

    println!("{}", crate::report::format_prior_table(args.model, &priors));

    if args.acceptance > 0 {
        let seed = resolve_seed(args.seed)?;
        let frac = priors.constraint_acceptance(seed, args.acceptance)?;
        println!(
            "Constraint acceptance: {frac:.5} ({} draws, seed {seed})",
            args.acceptance
        );
    }

    if let Some(path) = &args.export {
        crate::io::write_priors_json(path, args.model, &priors)?;
        info!("Wrote prior specification to {}", path.display());
    }
    Ok(())
}

fn handle_eval(args: EvalArgs) -> Result<(), AppError> {
    let params = pipeline::load_params(args.model, &args.params)?;
    let out = pipeline::run_eval(
        args.model,
        &params,
        args.data.as_deref(),
        freq_grid_from_args(&args.grid),
    )?;

    println!("Model {} ({})", args.model, args.model.display_name());
    print!("{}", crate::report::format_params(&params));
    println!();
    print!(
        "{}",
        crate::report::format_spectrum_preview(&out.freq_hz, &out.lam_sq, &out.spectrum, args.rows)
    );

    if let Some(path) = &args.export {
        crate::io::write_spectrum_csv(path, &out.freq_hz, &out.lam_sq, &out.spectrum)?;
        info!("Wrote {} channels to {}", out.spectrum.len(), path.display());
    }
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = simulate_config_from_args(&args)?;
    let violated = crate::models::priors(config.model).violated_constraints(&config.params)?;
    for name in &violated {
        warn!("True parameters violate prior constraint '{name}'");
    }

    let data = crate::data::simulate_spectrum(&config)?;
    crate::io::write_qu_csv(&args.out, &data)?;
    info!("Wrote simulated spectrum to {}", args.out.display());
    Ok(())
}

fn handle_draw(args: DrawArgs) -> Result<(), AppError> {
    let config = draw_config_from_args(&args)?;
    let out = pipeline::run_draws(&config)?;

    for (i, d) in out.draws.iter().enumerate() {
        println!("Draw {}:", i + 1);
        print!("{}", crate::report::format_params(d));
    }

    if let Some(path) = &config.export {
        let columns: Vec<&str> = out.columns.iter().map(String::as_str).collect();
        crate::io::write_draws_csv(path, &columns, &out.draws)?;
        info!("Wrote {} draws to {}", out.draws.len(), path.display());
    }
    Ok(())
}

fn handle_loglike(args: LoglikeArgs) -> Result<(), AppError> {
    let score = pipeline::run_score(args.model, &args.params, &args.data)?;
    if score.skipped_rows > 0 {
        warn!("{} data rows were skipped", score.skipped_rows);
    }
    for name in &score.violated {
        warn!("Parameters violate prior constraint '{name}'");
    }

    print!("{}", crate::report::format_params(&score.params));
    println!();
    print!("{}", crate::report::format_quality(&score.quality, score.ln_prior));
    Ok(())
}
