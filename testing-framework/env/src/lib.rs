use std::{env, path::PathBuf};

#[must_use]
pub fn slow_test_env() -> bool {
    env::var("SLOW_TEST_ENV").is_ok_and(|s| s == "true")
}

#[must_use]
pub fn rust_log() -> Option<String> {
    env::var("RUST_LOG").ok()
}

/// YAML file overriding the default scenario configuration.
#[must_use]
pub fn ln_scenario_config() -> Option<PathBuf> {
    env::var("LN_SCENARIO_CONFIG").ok().map(PathBuf::from)
}

/// YAML topology descriptor used by the simulated runner demo.
#[must_use]
pub fn ln_topology_file() -> Option<PathBuf> {
    env::var("LN_TOPOLOGY_FILE").ok().map(PathBuf::from)
}

#[must_use]
pub fn ln_report_json() -> bool {
    env::var("LN_REPORT_JSON").is_ok_and(|val| val.eq_ignore_ascii_case("true") || val == "1")
}

/// Raw `LN_DEMO_NODES` value: ring size of the demo's built-in topology.
#[must_use]
pub fn ln_demo_nodes() -> Option<String> {
    env::var("LN_DEMO_NODES").ok()
}
