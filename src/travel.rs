//! Long-distance travel: random trips to arbitrary cells and air travel over
//! precomputed flow tables.
//!
//! Travel is a position mutation plus a sentinel: a travelling agent stores
//! its own id in the `random_travel` / `air_travel` column, so returning
//! everyone home is a scan of the column for non-negative entries. Travellers
//! keep their destination position through the commute phases and interact
//! only where the candidate predicates allow.

use rand::Rng;

use crate::agents::AgentStore;
use crate::error::EpigridError;
use crate::geom::Domain;
use crate::random::{agent_rng, RngStream};

/// Air traffic tables: every community is served by one origin airport;
/// airports carry a cumulative distribution over destination airports, and
/// each destination airport one over its arrival communities.
#[derive(Debug, Clone, Default)]
pub struct AirTravelFlow {
    /// Airport serving each community, indexed by global cell index.
    pub origin_airport: Vec<usize>,
    /// Per-community daily probability of flying.
    pub travel_prob: Vec<f64>,
    /// Per-airport offsets into `dest_airports` / `dest_probs`.
    pub dest_offsets: Vec<usize>,
    pub dest_airports: Vec<usize>,
    /// Cumulative probabilities, non-decreasing within each airport's range.
    pub dest_probs: Vec<f64>,
    /// Per-airport offsets into `arrival_cells` / `arrival_probs`.
    pub arrival_offsets: Vec<usize>,
    pub arrival_cells: Vec<(i32, i32)>,
    pub arrival_probs: Vec<f64>,
}

impl AirTravelFlow {
    fn num_airports(&self) -> usize {
        self.dest_offsets.len().saturating_sub(1)
    }

    pub fn validate(&self, domain: &Domain) -> Result<(), EpigridError> {
        let bad = |reason: String| EpigridError::BadConfig(format!("air travel: {reason}"));
        let n_cells = domain.num_cells();
        if self.origin_airport.len() != n_cells || self.travel_prob.len() != n_cells {
            return Err(bad("tables must cover every community".into()));
        }
        let n_airports = self.num_airports();
        if self.arrival_offsets.len() != n_airports + 1 {
            return Err(bad(
                "offset tables disagree on the number of airports".into()
            ));
        }
        for &airport in &self.origin_airport {
            if airport >= n_airports {
                return Err(bad(format!("origin airport {airport} out of range")));
            }
        }
        for &p in &self.travel_prob {
            if !(0.0..=1.0).contains(&p) {
                return Err(bad(format!("travel probability {p} outside [0, 1]")));
            }
        }
        for (offsets, cdf, label) in [
            (&self.dest_offsets, &self.dest_probs, "destination"),
            (&self.arrival_offsets, &self.arrival_probs, "arrival"),
        ] {
            if *offsets.last().unwrap_or(&0) != cdf.len() {
                return Err(bad(format!("{label} offsets do not cover the table")));
            }
            for w in offsets.windows(2) {
                if w[1] < w[0] {
                    return Err(bad(format!("{label} offsets must be non-decreasing")));
                }
                let mut last = 0.0;
                for &p in &cdf[w[0]..w[1]] {
                    if p < last || p > 1.0 {
                        return Err(bad(format!(
                            "{label} CDF is not non-decreasing in [0, 1]"
                        )));
                    }
                    last = p;
                }
            }
        }
        if self.dest_airports.len() != self.dest_probs.len() {
            return Err(bad("destination airport table length mismatch".into()));
        }
        if self.arrival_cells.len() != self.arrival_probs.len() {
            return Err(bad("arrival cell table length mismatch".into()));
        }
        for &(i, j) in &self.arrival_cells {
            if !domain.contains(i, j) {
                return Err(bad(format!("arrival cell ({i}, {j}) outside the domain")));
            }
        }
        Ok(())
    }

    fn pick_by_cdf(cdf: &[f64], draw: f64) -> Option<usize> {
        let slot = cdf.partition_point(|&p| p <= draw);
        (slot < cdf.len()).then_some(slot)
    }

    /// Samples a destination community for an agent homed in `cell`, or
    /// `None` when the flow tables carry no route from its airport.
    fn sample_destination(&self, cell: usize, rng: &mut impl Rng) -> Option<(i32, i32)> {
        let origin = self.origin_airport[cell];
        let dests = self.dest_offsets[origin]..self.dest_offsets[origin + 1];
        let slot = Self::pick_by_cdf(&self.dest_probs[dests.clone()], rng.random::<f64>())?;
        let dest_airport = self.dest_airports[dests][slot];

        let arrivals = self.arrival_offsets[dest_airport]..self.arrival_offsets[dest_airport + 1];
        let slot = Self::pick_by_cdf(&self.arrival_probs[arrivals.clone()], rng.random::<f64>())?;
        Some(self.arrival_cells[arrivals][slot])
    }
}

/// Precomputes each agent's air travel destination from the flow tables.
/// Agents whose airport has no outgoing routes keep `trav_* = -1`.
pub fn set_air_travel(store: &mut AgentStore, flow: &AirTravelFlow, base_seed: u64) {
    let domain = *store.domain();
    store.par_tiles_mut(|tile| {
        for k in 0..tile.len() {
            let mut rng = agent_rng(base_seed, RngStream::AirTravelSetup, tile.id[k], 0);
            let cell = domain.cell_index(tile.home_i[k], tile.home_j[k]);
            match flow.sample_destination(cell, &mut rng) {
                Some((i, j)) => {
                    tile.trav_i[k] = i;
                    tile.trav_j[k] = j;
                }
                None => {
                    tile.trav_i[k] = -1;
                    tile.trav_j[k] = -1;
                }
            }
        }
    });
}

/// Sends agents to their precomputed air destination with their community's
/// travel probability. Redistribution happens with the next movement phase.
pub fn move_air_travel(store: &mut AgentStore, flow: &AirTravelFlow, base_seed: u64, day: u32) {
    let domain = *store.domain();
    store.par_tiles_mut(|tile| {
        for k in 0..tile.len() {
            if tile.in_hospital(k)
                || tile.withdrawn[k]
                || tile.random_travel[k] >= 0
                || tile.air_travel[k] >= 0
                || tile.trav_i[k] < 0
            {
                continue;
            }
            let cell = domain.cell_index(tile.home_i[k], tile.home_j[k]);
            let mut rng = agent_rng(base_seed, RngStream::AirTravel, tile.id[k], day);
            if rng.random::<f64>() < flow.travel_prob[cell] {
                tile.pos_i[k] = tile.trav_i[k];
                tile.pos_j[k] = tile.trav_j[k];
                tile.air_travel[k] = tile.id[k] as i64;
            }
        }
    });
}

/// Sends a random fraction of agents to uniformly random cells.
pub fn move_random_travel(store: &mut AgentStore, prob: f64, base_seed: u64, day: u32) {
    let (nx, ny) = store.domain().extent();
    store.par_tiles_mut(|tile| {
        for k in 0..tile.len() {
            if tile.in_hospital(k)
                || tile.withdrawn[k]
                || tile.random_travel[k] >= 0
                || tile.air_travel[k] >= 0
            {
                continue;
            }
            let mut rng = agent_rng(base_seed, RngStream::RandomTravel, tile.id[k], day);
            if rng.random::<f64>() < prob {
                tile.random_travel[k] = tile.id[k] as i64;
                tile.pos_i[k] = rng.random_range(0..nx);
                tile.pos_j[k] = rng.random_range(0..ny);
            }
        }
    });
}

/// Returns every random traveller to its home cell.
pub fn return_random_travel(store: &mut AgentStore) {
    store.par_tiles_mut(|tile| {
        for k in 0..tile.len() {
            if tile.random_travel[k] >= 0 {
                tile.random_travel[k] = -1;
                tile.pos_i[k] = tile.home_i[k];
                tile.pos_j[k] = tile.home_j[k];
            }
        }
    });
    store.redistribute();
}

/// Returns every air traveller to its home cell.
pub fn return_air_travel(store: &mut AgentStore) {
    store.par_tiles_mut(|tile| {
        for k in 0..tile.len() {
            if tile.air_travel[k] >= 0 {
                tile.air_travel[k] = -1;
                tile.pos_i[k] = tile.home_i[k];
                tile.pos_j[k] = tile.home_j[k];
            }
        }
    });
    store.redistribute();
}
