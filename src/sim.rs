//! The per-day phase sequence and simulation-wide commands.
//!
//! One simulated day:
//! 1. disease progression (which resets the survival accumulators for the
//!    new day), hospital treatment, hospitalized agents moved to their
//!    hospital cell
//! 2. morning commute (everyone to work, redistribute)
//! 3. day interactions: work, school, work neighborhood
//! 4. evening commute (everyone home, redistribute)
//! 5. night interactions: home, home neighborhood
//! 6. infection resolution
//! 7. travel: returns when due, then new random/air trips
//!
//! Phases are strictly ordered; within a phase tiles run in parallel with no
//! cross-tile ordering.

use rand::Rng;

use crate::agents::defs::Status;
use crate::agents::{AgentStore, Tile};
use crate::config::SimConfig;
use crate::disease::Disease;
use crate::error::EpigridError;
use crate::geom::Domain;
use crate::hospital;
use crate::infection;
use crate::interaction::InteractionModel;
use crate::log::{debug, info};
use crate::progression;
use crate::random::{agent_rng, RngStream};
use crate::stats::{self, StatsAccumulator, StatusTotals};
use crate::travel::{self, AirTravelFlow};

pub struct Simulation {
    config: SimConfig,
    store: AgentStore,
    diseases: Vec<Disease>,
    stats: StatsAccumulator,
    air: Option<AirTravelFlow>,
    day: u32,
    schools_closed: bool,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self, EpigridError> {
        config.validate()?;
        let domain = Domain::new(config.nx, config.ny, config.tile_size)?;
        let diseases: Vec<Disease> = config
            .diseases
            .iter()
            .cloned()
            .map(Disease::new)
            .collect::<Result<_, _>>()?;
        let store = AgentStore::new(domain, diseases.len(), config.fast_bin);
        let stats = StatsAccumulator::new(domain, diseases.len());
        Ok(Simulation {
            config,
            store,
            diseases,
            stats,
            air: None,
            day: 0,
            schools_closed: false,
        })
    }

    #[must_use]
    pub fn store(&self) -> &AgentStore {
        &self.store
    }

    #[must_use]
    pub fn store_mut(&mut self) -> &mut AgentStore {
        &mut self.store
    }

    #[must_use]
    pub fn stats(&self) -> &StatsAccumulator {
        &self.stats
    }

    #[must_use]
    pub fn diseases(&self) -> &[Disease] {
        &self.diseases
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Installs air-traffic flow tables and precomputes every agent's
    /// destination. Call after the population is loaded.
    pub fn set_air_travel_flow(&mut self, flow: AirTravelFlow) -> Result<(), EpigridError> {
        flow.validate(self.store.domain())?;
        travel::set_air_travel(&mut self.store, &flow, self.config.seed);
        self.air = Some(flow);
        Ok(())
    }

    /// Seeds the configured number of random initial cases for each disease.
    pub fn seed_initial_cases(&mut self) -> Result<(), EpigridError> {
        for d in 0..self.diseases.len() {
            let num_cases = self.diseases[d].params().num_initial_cases;
            if num_cases > 0 {
                infection::seed_initial_cases_random(
                    &mut self.store,
                    &self.diseases,
                    d,
                    num_cases,
                    self.config.seed,
                )?;
            }
        }
        Ok(())
    }

    /// Shelter-in-place: withdraws each agent with the configured compliance.
    pub fn shelter_start(&mut self) {
        info!("starting shelter in place order");
        let compliance = self.config.shelter_compliance;
        let seed = self.config.seed;
        let day = self.day;
        self.store.par_tiles_mut(|tile| {
            for k in 0..tile.len() {
                let mut rng = agent_rng(seed, RngStream::Shelter, tile.id[k], day);
                if rng.random::<f64>() < compliance {
                    tile.withdrawn[k] = true;
                }
            }
        });
    }

    /// Lifts shelter-in-place for everyone.
    pub fn shelter_stop(&mut self) {
        info!("stopping shelter in place order");
        self.store.par_tiles_mut(|tile| {
            for k in 0..tile.len() {
                tile.withdrawn[k] = false;
            }
        });
    }

    /// Closes every school: enrolled agents stop attending and the
    /// closed-school contact tables take effect.
    pub fn school_close(&mut self) {
        info!("closing schools");
        self.schools_closed = true;
        self.store.par_tiles_mut(|tile| {
            for k in 0..tile.len() {
                if tile.school_id[k] > 0 {
                    tile.school_closed[k] = true;
                }
            }
        });
    }

    /// Reopens every school.
    pub fn school_open(&mut self) {
        info!("reopening schools");
        self.schools_closed = false;
        self.store.par_tiles_mut(|tile| {
            for k in 0..tile.len() {
                tile.school_closed[k] = false;
            }
        });
    }

    fn apply_scheduled_commands(&mut self) {
        if let Some(window) = self.config.shelter {
            if self.day == window.start {
                self.shelter_start();
            }
            if self.day == window.stop {
                self.shelter_stop();
            }
        }
        if let Some(window) = self.config.school_closure {
            if self.day == window.start {
                self.school_close();
            }
            if self.day == window.stop {
                self.school_open();
            }
        }
    }

    /// Advances the simulation by one day.
    ///
    /// The status update leads the day so that the progression kernel's
    /// `prob` reset prepares the accumulator the interaction kernels multiply
    /// down; the resolver consumes it at day end, before the next reset.
    pub fn step(&mut self) {
        let day = self.day;
        let seed = self.config.seed;
        self.apply_scheduled_commands();

        debug!("day {day}: status update");
        progression::update_agents(
            &mut self.store,
            &self.diseases,
            &self.stats,
            self.config.symptomatic_withdraw_compliance,
            seed,
            day,
        );
        hospital::treat_agents(&mut self.store, &self.diseases, &self.stats, seed, day);
        self.store.move_hospitalized();

        debug!("day {day}: morning commute");
        self.store.move_agents_to_work();

        debug!("day {day}: day interactions");
        for model in [
            InteractionModel::Work,
            InteractionModel::School,
            InteractionModel::WorkNborhood,
        ] {
            model.interact(&mut self.store, &self.diseases, self.schools_closed);
        }

        debug!("day {day}: evening commute");
        self.store.move_agents_to_home();

        debug!("day {day}: night interactions");
        for model in [InteractionModel::Home, InteractionModel::HomeNborhood] {
            model.interact(&mut self.store, &self.diseases, self.schools_closed);
        }

        debug!("day {day}: infection resolution");
        infection::infect_agents(&mut self.store, &self.diseases, seed, day);

        if self.config.random_travel_prob > 0.0 {
            if (day + 1) % self.config.random_travel_return_interval == 0 {
                debug!("day {day}: returning random travellers");
                travel::return_random_travel(&mut self.store);
            }
            travel::move_random_travel(
                &mut self.store,
                self.config.random_travel_prob,
                seed,
                day,
            );
        }
        if let Some(flow) = &self.air {
            if (day + 1) % self.config.air_travel_return_interval == 0 {
                debug!("day {day}: returning air travellers");
                travel::return_air_travel(&mut self.store);
            }
            travel::move_air_travel(&mut self.store, flow, seed, day);
        }

        self.day += 1;
    }

    /// Runs the configured number of days, logging a summary per disease.
    pub fn run(&mut self) {
        for _ in 0..self.config.days {
            self.step();
            for d in 0..self.diseases.len() {
                let totals = self.status_totals(d);
                info!(
                    "day {} {}: infected {} (exposed {}) immune {} dead {}",
                    self.day,
                    self.diseases[d].name(),
                    totals.infected,
                    totals.exposed,
                    totals.immune,
                    totals.dead,
                );
            }
        }
    }

    /// Population-wide status counts for one disease.
    #[must_use]
    pub fn status_totals(&self, d: usize) -> StatusTotals {
        stats::status_totals(&self.store, d)
    }

    /// Cross-cutting data-model invariants, checked by tests after every
    /// simulated day.
    pub fn check_invariants(&self) -> Result<(), EpigridError> {
        fn check_tile(tile: &Tile, n_diseases: usize) -> Result<(), EpigridError> {
            for k in 0..tile.len() {
                if (tile.hosp_i[k] >= 0) != (tile.hosp_j[k] >= 0) {
                    return Err(EpigridError::BrokenInvariant(format!(
                        "agent {}: half-set hospital cell",
                        tile.id[k]
                    )));
                }
                let dead = tile.diseases[0].status[k] == Status::Dead;
                for d in 1..n_diseases {
                    if (tile.diseases[d].status[k] == Status::Dead) != dead {
                        return Err(EpigridError::BrokenInvariant(format!(
                            "agent {}: death not propagated",
                            tile.id[k]
                        )));
                    }
                }
                if tile.in_hospital(k)
                    && !tile
                        .diseases
                        .iter()
                        .any(|cols| cols.status[k] == Status::Infected)
                {
                    return Err(EpigridError::BrokenInvariant(format!(
                        "agent {}: hospitalized without an active infection",
                        tile.id[k]
                    )));
                }
            }
            Ok(())
        }
        for tile in self.store.tiles() {
            check_tile(tile, self.diseases.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::defs::AgeGroup;
    use crate::agents::AgentAttributes;

    fn simulation_with_population(n: usize) -> Simulation {
        let mut sim = Simulation::new(SimConfig::for_testing(8, 8, 5)).unwrap();
        for k in 0..n {
            sim.store_mut()
                .push_agent(&AgentAttributes {
                    age_group: AgeGroup::A30to49,
                    family: (k / 4) as i32,
                    nborhood: 0,
                    home: ((k % 8) as i32, ((k / 8) % 8) as i32),
                    work: Some((((k + 1) % 8) as i32, 0)),
                    workgroup: 1,
                    naics: 0,
                    work_nborhood: 0,
                    school_id: 0,
                    school_grade: 0,
                })
                .unwrap();
        }
        sim
    }

    #[test]
    fn day_loop_preserves_agent_count() {
        let mut sim = simulation_with_population(32);
        let before = sim.store().num_agents();
        for _ in 0..3 {
            sim.step();
            sim.check_invariants().unwrap();
        }
        assert_eq!(sim.store().num_agents(), before);
    }

    #[test]
    fn shelter_round_trip_restores_withdrawal() {
        let mut sim = simulation_with_population(16);
        // no infection activity: everyone starts not withdrawn
        sim.shelter_start();
        let withdrawn: usize = sim
            .store()
            .tiles()
            .iter()
            .map(|t| t.withdrawn.iter().filter(|&&w| w).count())
            .sum();
        assert!(withdrawn > 0);
        sim.shelter_stop();
        for tile in sim.store().tiles() {
            assert!(tile.withdrawn.iter().all(|&w| !w));
        }
    }

    #[test]
    fn school_closure_flags_enrolled_agents_only() {
        let mut sim = simulation_with_population(4);
        sim.store_mut()
            .push_agent(&AgentAttributes {
                age_group: AgeGroup::A5to17,
                family: 9,
                nborhood: 0,
                home: (0, 0),
                work: None,
                workgroup: 0,
                naics: 0,
                work_nborhood: 0,
                school_id: 1,
                school_grade: 5,
            })
            .unwrap();
        sim.school_close();
        let mut closed = 0;
        for tile in sim.store().tiles() {
            for k in 0..tile.len() {
                if tile.school_closed[k] {
                    assert!(tile.school_id[k] > 0);
                    closed += 1;
                }
            }
        }
        assert_eq!(closed, 1);
        sim.school_open();
        for tile in sim.store().tiles() {
            assert!(tile.school_closed.iter().all(|&c| !c));
        }
    }
}
