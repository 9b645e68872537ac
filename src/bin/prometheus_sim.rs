use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::{Builder, Env};
use prometheus_sim::{Outcome, RunParams, SimulationConfig, SimulationEngine, SimulationResult};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a single simulation and print the trajectory
    #[clap(name = "run")]
    Run {
        #[clap(long, default_value = "2.0", allow_hyphen_values = true)]
        x: f64,
        #[clap(long, default_value = "2.0", allow_hyphen_values = true)]
        y: f64,
        #[clap(long, default_value = "1.0")]
        kp_dist: f64,
        #[clap(long, default_value = "2.0")]
        kp_theta: f64,
        #[clap(long, default_value = "csv")]
        format: OutputFormat,
        /// Reject parameters outside the recommended ranges
        #[clap(long, default_value = "false", action)]
        strict: bool,
    },

    /// Run every combination of gains towards one target
    #[clap(name = "sweep")]
    Sweep {
        #[clap(long, default_value = "2.0", allow_hyphen_values = true)]
        x: f64,
        #[clap(long, default_value = "2.0", allow_hyphen_values = true)]
        y: f64,
        #[clap(long, value_delimiter = ',', default_value = "0.5,1.0,2.0")]
        kp_dist: Vec<f64>,
        #[clap(long, value_delimiter = ',', default_value = "1.0,2.0,4.0")]
        kp_theta: Vec<f64>,
    },
}

#[derive(Debug, Parser)]
#[command(name = "prometheus_sim")]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// JSON file overriding the simulation constants
    #[clap(long, short = 'c')]
    config: Option<PathBuf>,
}

fn load_engine(path: Option<&PathBuf>) -> Result<SimulationEngine> {
    let config = match path {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    Ok(SimulationEngine::new(config)?)
}

fn write_csv(result: &SimulationResult) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "step,x,y")?;
    for (i, p) in result.trajectory.iter().enumerate() {
        writeln!(out, "{},{},{}", i, p.x, p.y)?;
    }
    Ok(())
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Converged { steps } => format!("converged in {} steps", steps),
        Outcome::TimedOut => "timed out".to_string(),
    }
}

fn run_once(engine: &SimulationEngine, params: RunParams, format: OutputFormat, strict: bool) -> Result<()> {
    let out_of_range = params.out_of_recommended_range();
    if strict && !out_of_range.is_empty() {
        bail!("Parameters outside the recommended range: {:?}", out_of_range);
    }

    let result = engine.run(&params)?;
    match format {
        OutputFormat::Csv => {
            write_csv(&result)?;
            let heading = result.heading_vector();
            eprintln!(
                "{}; final pose ({:.3}, {:.3}), theta {:.3} rad, heading ({:.3}, {:.3}), error {:.4} m",
                describe(&result.outcome),
                result.final_pose.x,
                result.final_pose.y,
                result.final_theta(),
                heading.x,
                heading.y,
                result.final_error()
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

async fn sweep(engine: SimulationEngine, x: f64, y: f64, kp_dist: Vec<f64>, kp_theta: Vec<f64>) -> Result<()> {
    let engine = Arc::new(engine);
    let mut handles = Vec::new();
    for &kd in &kp_dist {
        for &kt in &kp_theta {
            let engine = Arc::clone(&engine);
            let params = RunParams::new(x, y, kd, kt);
            // Each task builds its own controllers inside `run`
            handles.push(tokio::task::spawn_blocking(move || engine.run(&params)));
        }
    }

    println!("kp_dist,kp_theta,outcome,steps,final_error");
    for handle in handles {
        let result = handle.await.context("Simulation task panicked")??;
        println!(
            "{},{},{},{},{:.4}",
            result.params.kp_dist,
            result.params.kp_theta,
            describe(&result.outcome),
            result.step_count(),
            result.final_error()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let engine = load_engine(cli.config.as_ref())?;

    match cli.command {
        Command::Run {
            x,
            y,
            kp_dist,
            kp_theta,
            format,
            strict,
        } => run_once(&engine, RunParams::new(x, y, kp_dist, kp_theta), format, strict),
        Command::Sweep {
            x,
            y,
            kp_dist,
            kp_theta,
        } => sweep(engine, x, y, kp_dist, kp_theta).await,
    }
}
