//! flashsim CLI — replay I/O traces against fairness scheduling policies.

use clap::{Parser, Subcommand};
use flashsim_core::config::SimConfig;
use flashsim_core::metrics::{format_comparison_table, format_table};
use flashsim_core::trace;
use flashsim_schedulers::{available_policies, scheduler_by_name};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "flashsim",
    about = "Simulate multi-tenant SSD admission scheduling",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation with a single scheduling policy.
    Run {
        /// Path to a TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Path to the trace file (CSV or blkparse output).
        #[arg(short, long)]
        trace: Option<PathBuf>,
        /// Scheduling policy: rr, drr, qfq, or sgfs.
        #[arg(short, long)]
        scheduler: Option<String>,
        /// DRR quantum in bytes.
        #[arg(short, long)]
        quantum: Option<f64>,
        /// Tenant count override (default: inferred from the trace).
        #[arg(short, long)]
        users: Option<u32>,
        /// Channel count override.
        #[arg(short, long)]
        channels: Option<u32>,
        /// Aggregate read bandwidth in MB/s.
        #[arg(long)]
        read_bw: Option<f64>,
        /// Aggregate write bandwidth in MB/s.
        #[arg(long)]
        write_bw: Option<f64>,
        /// Comma-separated per-tenant weights.
        #[arg(short = 'W', long, value_delimiter = ',')]
        weights: Vec<f64>,
        /// SGFS rotation interval in picks.
        #[arg(long)]
        rotate_every: Option<u32>,
        /// SGFS rotation stride.
        #[arg(long)]
        gap: Option<u32>,
        /// Per-tenant results CSV path.
        #[arg(short, long, default_value = "results.csv")]
        output: PathBuf,
        /// Also write the report as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Compare several policies on the same trace.
    Compare {
        /// Path to a TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Path to the trace file.
        #[arg(short, long)]
        trace: Option<PathBuf>,
        /// Comma-separated policy names (default: all).
        #[arg(short = 'P', long, value_delimiter = ',')]
        policies: Vec<String>,
        /// Write the reports as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Generate a synthetic trace CSV.
    GenTrace {
        /// Number of tenants.
        #[arg(long, default_value = "4")]
        users: u32,
        /// Number of requests.
        #[arg(long, default_value = "1000")]
        requests: usize,
        /// RNG seed.
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Output file path.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List recognized scheduling policies.
    ListPolicies,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            trace: trace_path,
            scheduler,
            quantum,
            users,
            channels,
            read_bw,
            write_bw,
            weights,
            rotate_every,
            gap,
            output,
            json,
        } => {
            let mut sim_config = load_config(config.as_deref());
            if let Some(path) = trace_path {
                sim_config.trace.path = Some(path.display().to_string());
            }
            if let Some(policy) = scheduler {
                sim_config.scheduler.policy = policy;
            }
            if let Some(q) = quantum {
                sim_config.scheduler.quantum = q;
            }
            if let Some(u) = users {
                sim_config.simulation.users = u;
            }
            if let Some(c) = channels {
                sim_config.device.channels = c;
            }
            if let Some(bw) = read_bw {
                sim_config.device.read_bw_mbps = bw;
            }
            if let Some(bw) = write_bw {
                sim_config.device.write_bw_mbps = bw;
            }
            if !weights.is_empty() {
                sim_config.scheduler.weights = weights;
            }
            if let Some(r) = rotate_every {
                sim_config.scheduler.rotate_every = r;
            }
            if let Some(g) = gap {
                sim_config.scheduler.gap = g;
            }
            sim_config.validate().unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });

            let requests = load_requests(&sim_config);
            let policy = sim_config.scheduler.policy.clone();
            let sched = scheduler_by_name(
                &policy,
                sim_config.scheduler.rotate_every,
                sim_config.scheduler.gap,
            )
            .unwrap_or_else(|| {
                eprintln!(
                    "Unknown scheduler policy: {}. Available: {:?}",
                    policy,
                    available_policies()
                );
                std::process::exit(1);
            });

            let stats = flashsim_core::run_simulation(&sim_config, sched, requests)
                .unwrap_or_else(|e| {
                    eprintln!("Simulation error: {}", e);
                    std::process::exit(1);
                });

            let report = stats.report(&policy);
            println!("{}", format_table(&report));

            // A result-write failure is a warning; in-memory results stand.
            match stats.save_csv(&output) {
                Ok(()) => println!("Results saved to {}", output.display()),
                Err(e) => eprintln!("Warning: failed to write {}: {}", output.display(), e),
            }
            if let Some(json_path) = json {
                write_json(&json_path, &report);
            }
        }
        Commands::Compare {
            config,
            trace: trace_path,
            policies,
            json,
        } => {
            let mut sim_config = load_config(config.as_deref());
            if let Some(path) = trace_path {
                sim_config.trace.path = Some(path.display().to_string());
            }
            sim_config.validate().unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });

            let requests = load_requests(&sim_config);
            let policy_names: Vec<&str> = if policies.is_empty() {
                available_policies()
            } else {
                policies.iter().map(|s| s.as_str()).collect()
            };

            let reports =
                flashsim_core::compare_policies(&sim_config, &policy_names, &requests)
                    .unwrap_or_else(|e| {
                        eprintln!("Simulation error: {}", e);
                        std::process::exit(1);
                    });
            println!("{}", format_comparison_table(&reports));
            for report in &reports {
                println!("{}", format_table(report));
            }
            if let Some(json_path) = json {
                write_json(&json_path, &reports);
            }
        }
        Commands::GenTrace {
            users,
            requests,
            seed,
            output,
        } => {
            let generated = trace::gen_trace(users, requests, seed);
            trace::write_trace_csv(&generated, &output).unwrap_or_else(|e| {
                eprintln!("Error writing trace: {}", e);
                std::process::exit(1);
            });
            println!(
                "Generated {} requests to {}",
                generated.len(),
                output.display()
            );
        }
        Commands::ListPolicies => {
            println!("Available scheduling policies:");
            for name in available_policies() {
                println!("  - {}", name);
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> SimConfig {
    match path {
        Some(p) => SimConfig::from_file(p).unwrap_or_else(|e| {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }),
        None => SimConfig::default(),
    }
}

fn load_requests(config: &SimConfig) -> Vec<flashsim_schedulers::Request> {
    match config.trace.path.as_deref() {
        Some(path) => trace::load_trace_csv(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("Error loading trace: {}", e);
            std::process::exit(1);
        }),
        None => {
            eprintln!("No trace file specified. Use --trace or set trace.path in the config.");
            std::process::exit(1);
        }
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, json) {
                eprintln!("Warning: failed to write {}: {}", path.display(), e);
            } else {
                println!("Report written to {}", path.display());
            }
        }
        Err(e) => eprintln!("Warning: failed to serialize report: {}", e),
    }
}
