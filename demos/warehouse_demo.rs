// Demonstration: run the warehouse environment with a random policy.
//
// Run from the repo root:
//   cargo run --example warehouse_demo -- --episodes 5 --robots 4 --seed 42

use std::env;

use tracing_subscriber::{EnvFilter, FmtSubscriber};
use warehouse_sim::{EvaluationMetrics, Policy, RandomPolicy, WarehouseConfig, WarehouseEnv};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warehouse_sim=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let episodes: usize = arg_value(&args, "--episodes")
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);
    let robots: usize = arg_value(&args, "--robots")
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);
    let seed: u64 = arg_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    let config = WarehouseConfig {
        n_robots: robots,
        ..WarehouseConfig::default()
    };
    let mut env = WarehouseEnv::new(config, seed)?;
    let mut policy = RandomPolicy::new(seed);

    let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, episodes)?;
    println!("Policy: {}", policy.name());
    println!("{}", metrics);

    if let Some(snapshot) = env.snapshot() {
        for (i, pose) in snapshot.poses.iter().enumerate() {
            println!(
                "  Robot {}: {} loaded={}",
                i, pose.position, snapshot.loaded[i]
            );
        }
    }
    Ok(())
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
