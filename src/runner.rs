//! Command-line entry point: loads a configuration and population, runs the
//! simulation, and writes the per-day reports.

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::agents::AgentAttributes;
use crate::config::SimConfig;
use crate::error::EpigridError;
use crate::log::{info, set_log_level, LevelFilter};
use crate::report::{ReportConfig, ReportWriter};
use crate::sim::Simulation;
use crate::stats;

/// Default command-line arguments.
#[derive(Parser, Debug)]
#[command(about = "Agent-based epidemic simulation over a tiled community grid")]
pub struct BaseArgs {
    /// Path to the simulation configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Override the configured random seed
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Directory for report output
    #[arg(short, long = "output")]
    pub output_dir: Option<PathBuf>,

    /// Prefix for report files
    #[arg(long = "prefix")]
    pub file_prefix: Option<String>,

    /// Overwrite existing report files?
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Enable logging at the given level (error, warn, info, debug, trace)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

fn load_population(sim: &mut Simulation, path: &Path) -> Result<(), EpigridError> {
    let text = fs::read_to_string(path)?;
    let people: Vec<AgentAttributes> = serde_json::from_str(&text)?;
    for attrs in &people {
        sim.store_mut().push_agent(attrs)?;
    }
    info!("loaded {} agents from {}", people.len(), path.display());
    Ok(())
}

/// Runs a simulation from parsed arguments. `setup` is called after the
/// population is loaded and before the initial cases are seeded, so callers
/// can install air-travel tables or adjust the store.
pub fn run_with_args(
    args: &BaseArgs,
    setup: impl FnOnce(&mut Simulation) -> Result<(), EpigridError>,
) -> Result<(), EpigridError> {
    if let Some(level) = &args.log_level {
        let level = LevelFilter::from_str(level)
            .map_err(|_| EpigridError::BadConfig(format!("invalid log level: {level}")))?;
        set_log_level(level);
    }

    let mut config = SimConfig::from_file(&args.config)?;
    if let Some(seed) = args.random_seed {
        config.seed = seed;
    }
    let population = config.population.clone().ok_or_else(|| {
        EpigridError::BadConfig("configuration does not name a population file".into())
    })?;
    let days = config.days;

    let mut sim = Simulation::new(config)?;
    load_population(&mut sim, &population)?;
    stats::log_age_group_census(sim.store());
    stats::log_school_census(sim.store());

    setup(&mut sim)?;
    sim.seed_initial_cases()?;

    let mut reports = ReportWriter::new(&ReportConfig {
        output_dir: args.output_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
        file_prefix: args.file_prefix.clone().unwrap_or_default(),
        overwrite: args.force_overwrite,
    })?;

    for _ in 0..days {
        sim.step();
        reports.write_day(&sim)?;
    }
    info!("simulation finished after {days} days");
    Ok(())
}

/// Parses the process arguments and runs.
pub fn run() -> Result<(), EpigridError> {
    let args = BaseArgs::parse();
    run_with_args(&args, |_| Ok(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::defs::AgeGroup;
    use tempfile::tempdir;

    #[test]
    fn end_to_end_from_files() {
        let dir = tempdir().unwrap();

        let population: Vec<AgentAttributes> = (0..8)
            .map(|k| AgentAttributes {
                age_group: AgeGroup::A30to49,
                family: k / 2,
                nborhood: 0,
                home: (k % 4, 0),
                work: None,
                workgroup: 0,
                naics: 0,
                work_nborhood: 0,
                school_id: 0,
                school_grade: 0,
            })
            .collect();
        let population_path = dir.path().join("population.json");
        std::fs::write(
            &population_path,
            serde_json::to_string(&population).unwrap(),
        )
        .unwrap();

        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            serde_json::json!({
                "days": 2,
                "nx": 4,
                "ny": 4,
                "diseases": [{ "name": "alpha", "num_initial_cases": 2 }],
                "population": population_path,
            })
            .to_string(),
        )
        .unwrap();

        let args = BaseArgs {
            config: config_path,
            random_seed: Some(5),
            output_dir: Some(dir.path().join("out")),
            file_prefix: None,
            force_overwrite: false,
            log_level: None,
        };
        run_with_args(&args, |_| Ok(())).unwrap();

        let totals =
            std::fs::read_to_string(dir.path().join("out").join("status_totals.csv")).unwrap();
        // header + one row per day
        assert_eq!(totals.lines().count(), 3);
    }

    #[test]
    fn missing_population_is_fatal() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            serde_json::json!({
                "days": 1,
                "nx": 4,
                "ny": 4,
                "diseases": [{ "name": "alpha" }]
            })
            .to_string(),
        )
        .unwrap();
        let args = BaseArgs {
            config: config_path,
            random_seed: None,
            output_dir: None,
            file_prefix: None,
            force_overwrite: false,
            log_level: None,
        };
        assert!(run_with_args(&args, |_| Ok(())).is_err());
    }
}
