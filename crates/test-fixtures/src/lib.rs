//! Test fixtures for the Andon monitor: scenario files and a deterministic funnel simulator.
//!
//! Scenarios live in `scenarios/` next to this crate's manifest, so the loader works
//! from any crate in the workspace.

pub mod simulator;

use std::path::PathBuf;

use serde::de::DeserializeOwned;

pub use simulator::{AnomalyPattern, FunnelSimulator, MinuteBatch, SimulationConfig, StageRate};

/// Root directory of the scenario files.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a simulation scenario by name, e.g. `"payment_outage"`.
pub fn load_scenario(name: &str) -> SimulationConfig {
    load_fixture(&format!("{name}.json"))
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// Names of every scenario file, sorted.
pub fn list_scenarios() -> Vec<String> {
    let dir = fixtures_root();
    let mut names: Vec<String> = std::fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("Failed to read directory {}: {}", dir.display(), e))
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                path.file_stem().map(|s| s.to_string_lossy().into_owned())
            } else {
                None
            }
        })
        .collect();
    names.sort();
    names
}
