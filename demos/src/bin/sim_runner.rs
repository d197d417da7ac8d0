use std::process;

use anyhow::{Context as _, Result};
use ln_runner_examples::{defaults, demo};
use ln_testing_framework_core::{
    scenario::{Deployer as _, ScenarioConfig, ScenarioDriver, load_scenario_config},
    topology::load_topology,
};
use ln_testing_framework_env as tf_env;
use ln_testing_framework_runner_sim::SimDeployer;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    defaults::init_tracing();

    let nodes = demo::demo_nodes();
    info!(nodes, "starting simulated payment network demo");

    if let Err(err) = run_sim_case(nodes).await {
        warn!("simulated payment network demo failed: {err:#}");
        process::exit(1);
    }
}

async fn run_sim_case(nodes: usize) -> Result<()> {
    let descriptor = match tf_env::ln_topology_file() {
        Some(path) => load_topology(&path)?,
        None => demo::ring_topology(nodes),
    };
    let config = match tf_env::ln_scenario_config() {
        Some(path) => load_scenario_config(&path)?,
        None => ScenarioConfig::default(),
    };

    let deployer = SimDeployer::default();
    info!(nodes = descriptor.nodes.len(), "deploying simulated network");
    let deployment = deployer
        .deploy(&descriptor)
        .await
        .context("deploying simulated network failed")?;

    let report = ScenarioDriver::new(deployment, config)
        .run()
        .await
        .context("provisioning payment network failed")?;

    if tf_env::ln_report_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing readiness report")?
        );
    } else {
        println!("{report}");
    }
    Ok(())
}
