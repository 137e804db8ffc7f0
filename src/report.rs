//! CSV report writers for the per-day outputs: per-community disease
//! statistics and population-wide status totals.

use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;

use crate::agents::defs::StatChannel;
use crate::error::EpigridError;
use crate::sim::Simulation;
use crate::stats;

/// Where and how report files are written.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub overwrite: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            output_dir: PathBuf::from("."),
            file_prefix: String::new(),
            overwrite: false,
        }
    }
}

#[derive(Serialize)]
struct CommunityStatsRow<'a> {
    day: u32,
    disease: &'a str,
    i: i32,
    j: i32,
    population: u32,
    hospitalization: i64,
    icu: i64,
    ventilator: i64,
    death: i64,
}

#[derive(Serialize)]
struct StatusTotalsRow<'a> {
    day: u32,
    disease: &'a str,
    never: u64,
    infected: u64,
    immune: u64,
    susceptible: u64,
    dead: u64,
    exposed: u64,
    asymptomatic: u64,
    presymptomatic: u64,
    symptomatic: u64,
}

/// Writes one row per (day, disease, occupied community) to
/// `<prefix>community_stats.csv` and one row per (day, disease) to
/// `<prefix>status_totals.csv`.
pub struct ReportWriter {
    community: Writer<File>,
    totals: Writer<File>,
}

impl ReportWriter {
    pub fn new(config: &ReportConfig) -> Result<Self, EpigridError> {
        std::fs::create_dir_all(&config.output_dir)?;
        let open = |short_name: &str| -> Result<Writer<File>, EpigridError> {
            let filename = format!("{}{short_name}.csv", config.file_prefix);
            let path = config.output_dir.join(filename);
            if path.exists() && !config.overwrite {
                return Err(EpigridError::BadConfig(format!(
                    "report file {} exists; enable overwrite to replace it",
                    path.display()
                )));
            }
            Ok(Writer::from_writer(File::create(path)?))
        };
        Ok(ReportWriter {
            community: open("community_stats")?,
            totals: open("status_totals")?,
        })
    }

    /// Appends the current day's rows. Communities with no agents and no
    /// accumulated statistics are skipped.
    pub fn write_day(&mut self, sim: &Simulation) -> Result<(), EpigridError> {
        let day = sim.day();
        let domain = *sim.store().domain();
        let (nx, ny) = domain.extent();
        for (d, disease) in sim.diseases().iter().enumerate() {
            let totals = sim.status_totals(d);
            self.totals.serialize(StatusTotalsRow {
                day,
                disease: disease.name(),
                never: totals.never,
                infected: totals.infected,
                immune: totals.immune,
                susceptible: totals.susceptible,
                dead: totals.dead,
                exposed: totals.exposed,
                asymptomatic: totals.asymptomatic,
                presymptomatic: totals.presymptomatic,
                symptomatic: totals.symptomatic,
            })?;

            let cell_counts = stats::cell_status_counts(sim.store(), d);
            for j in 0..ny {
                for i in 0..nx {
                    let population = cell_counts[domain.cell_index(i, j)][0];
                    let row = CommunityStatsRow {
                        day,
                        disease: disease.name(),
                        i,
                        j,
                        population,
                        hospitalization: sim.stats().value(d, i, j, StatChannel::Hospitalization),
                        icu: sim.stats().value(d, i, j, StatChannel::Icu),
                        ventilator: sim.stats().value(d, i, j, StatChannel::Ventilator),
                        death: sim.stats().value(d, i, j, StatChannel::Death),
                    };
                    if population > 0
                        || row.hospitalization != 0
                        || row.icu != 0
                        || row.ventilator != 0
                        || row.death != 0
                    {
                        self.community.serialize(row)?;
                    }
                }
            }
        }
        self.community.flush()?;
        self.totals.flush()?;
        Ok(())
    }
}
