//! Per-community disease statistics and population censuses.
//!
//! The 4-channel community grid (hospitalizations, ICU, ventilator, deaths)
//! is written by the progression and hospital kernels. Updates post to the
//! agent's *home* community, which can lie in a different tile than the agent
//! currently occupies (commuters, travellers), so the grid is a flat array of
//! atomic cells rather than per-tile shards. It is only read at reporting
//! boundaries.

use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::agents::defs::{
    school_type_of_grade, SchoolType, StatChannel, Status, SymptomStatus, NUM_AGE_GROUPS,
    NUM_STAT_CHANNELS,
};
use crate::agents::AgentStore;
use crate::geom::Domain;
use crate::log::info;

/// Cumulative per-community counters, one 4-channel grid per disease.
pub struct StatsAccumulator {
    domain: Domain,
    grids: Vec<Vec<AtomicI64>>,
}

impl StatsAccumulator {
    #[must_use]
    pub fn new(domain: Domain, n_diseases: usize) -> Self {
        let grids = (0..n_diseases)
            .map(|_| {
                (0..domain.num_cells() * NUM_STAT_CHANNELS)
                    .map(|_| AtomicI64::new(0))
                    .collect()
            })
            .collect();
        StatsAccumulator { domain, grids }
    }

    fn slot(&self, i: i32, j: i32, channel: StatChannel) -> usize {
        self.domain.cell_index(i, j) * NUM_STAT_CHANNELS + channel as usize
    }

    pub fn add(&self, d: usize, i: i32, j: i32, channel: StatChannel, delta: i64) {
        self.grids[d][self.slot(i, j, channel)].fetch_add(delta, Ordering::Relaxed);
    }

    #[must_use]
    pub fn value(&self, d: usize, i: i32, j: i32, channel: StatChannel) -> i64 {
        self.grids[d][self.slot(i, j, channel)].load(Ordering::Relaxed)
    }

    /// Sum of one channel over the whole domain.
    #[must_use]
    pub fn channel_total(&self, d: usize, channel: StatChannel) -> i64 {
        self.grids[d]
            .iter()
            .skip(channel as usize)
            .step_by(NUM_STAT_CHANNELS)
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }

    #[must_use]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }
}

/// Population-wide status counts for one disease. `exposed` through
/// `symptomatic` partition the infected count: exposed agents are still
/// within their latent period, the rest split by symptom class.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusTotals {
    pub never: u64,
    pub infected: u64,
    pub immune: u64,
    pub susceptible: u64,
    pub dead: u64,
    pub exposed: u64,
    pub asymptomatic: u64,
    pub presymptomatic: u64,
    pub symptomatic: u64,
}

impl StatusTotals {
    fn combine(mut self, other: StatusTotals) -> StatusTotals {
        self.never += other.never;
        self.infected += other.infected;
        self.immune += other.immune;
        self.susceptible += other.susceptible;
        self.dead += other.dead;
        self.exposed += other.exposed;
        self.asymptomatic += other.asymptomatic;
        self.presymptomatic += other.presymptomatic;
        self.symptomatic += other.symptomatic;
        self
    }

    /// Total number of agents seen.
    #[must_use]
    pub fn population(&self) -> u64 {
        self.never + self.infected + self.immune + self.susceptible + self.dead
    }
}

/// Counts every agent's status for disease `d`.
#[must_use]
pub fn status_totals(store: &AgentStore, d: usize) -> StatusTotals {
    store
        .tiles()
        .par_iter()
        .map(|tile| {
            let mut t = StatusTotals::default();
            let cols = &tile.diseases[d];
            for k in 0..tile.len() {
                match cols.status[k] {
                    Status::Never => t.never += 1,
                    Status::Immune => t.immune += 1,
                    Status::Susceptible => t.susceptible += 1,
                    Status::Dead => t.dead += 1,
                    Status::Infected => {
                        t.infected += 1;
                        if tile.is_exposed(d, k) {
                            t.exposed += 1;
                        } else {
                            match cols.symptomatic[k] {
                                SymptomStatus::Asymptomatic => t.asymptomatic += 1,
                                SymptomStatus::Presymptomatic => t.presymptomatic += 1,
                                SymptomStatus::Symptomatic => t.symptomatic += 1,
                            }
                        }
                    }
                }
            }
            t
        })
        .reduce(StatusTotals::default, StatusTotals::combine)
}

/// Per-cell status counts for disease `d`: `[total, never, infected, immune,
/// susceptible]` per community, the dead excluded as in the plotfile feed.
#[must_use]
pub fn cell_status_counts(store: &AgentStore, d: usize) -> Vec<[u32; 5]> {
    let domain = *store.domain();
    let mut counts = vec![[0u32; 5]; domain.num_cells()];
    for tile in store.tiles() {
        let cols = &tile.diseases[d];
        for k in 0..tile.len() {
            let cell = domain.cell_index(tile.pos_i[k], tile.pos_j[k]);
            counts[cell][0] += 1;
            let status = cols.status[k];
            if status != Status::Dead {
                counts[cell][1 + status as usize] += 1;
            }
        }
    }
    counts
}

/// Logs the age-group composition of the population.
pub fn log_age_group_census(store: &AgentStore) {
    let counts = store
        .tiles()
        .par_iter()
        .map(|tile| {
            let mut counts = [0u64; NUM_AGE_GROUPS];
            for k in 0..tile.len() {
                counts[tile.age_group[k].index()] += 1;
            }
            counts
        })
        .reduce(
            || [0u64; NUM_AGE_GROUPS],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        );
    let total: u64 = counts.iter().sum::<u64>().max(1);
    info!(
        "age groups (count, %): u5 {} {:.1} | 5-17 {} {:.1} | 18-29 {} {:.1} | 30-49 {} {:.1} | 50-64 {} {:.1} | 65+ {} {:.1} | total {total}",
        counts[0], 100.0 * counts[0] as f64 / total as f64,
        counts[1], 100.0 * counts[1] as f64 / total as f64,
        counts[2], 100.0 * counts[2] as f64 / total as f64,
        counts[3], 100.0 * counts[3] as f64 / total as f64,
        counts[4], 100.0 * counts[4] as f64 / total as f64,
        counts[5], 100.0 * counts[5] as f64 / total as f64,
    );
}

/// Logs educator and student counts per school type. Educators are enrolled
/// agents that also belong to a workgroup.
pub fn log_school_census(store: &AgentStore) {
    // Indexed by SchoolType::College..=Daycare, shifted down by one.
    let (educators, students) = store
        .tiles()
        .par_iter()
        .map(|tile| {
            let mut educators = [0u64; 5];
            let mut students = [0u64; 5];
            for k in 0..tile.len() {
                if tile.school_id[k] > 0 {
                    let t = school_type_of_grade(tile.school_grade[k]);
                    if t == SchoolType::None {
                        continue;
                    }
                    let slot = t.index() - SchoolType::College.index();
                    if tile.workgroup[k] > 0 {
                        educators[slot] += 1;
                    } else {
                        students[slot] += 1;
                    }
                }
            }
            (educators, students)
        })
        .reduce(
            || ([0u64; 5], [0u64; 5]),
            |(mut ae, mut as_), (be, bs)| {
                for (x, y) in ae.iter_mut().zip(be) {
                    *x += y;
                }
                for (x, y) in as_.iter_mut().zip(bs) {
                    *x += y;
                }
                (ae, as_)
            },
        );
    for (slot, label) in ["college", "high", "middle", "elementary", "daycare"]
        .iter()
        .enumerate()
    {
        info!(
            "school census {label}: educators {} students {}",
            educators[slot], students[slot]
        );
    }
}
