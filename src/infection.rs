//! End-of-day infection resolution and initial-case seeding.
//!
//! During the day every interaction kernel multiplied `prob` down from 1; at
//! day end `1 - prob` is the probability of infection. The resolver draws for
//! every never-infected or susceptible agent and, on success, starts a fresh
//! infection with newly sampled disease periods.

use rand::seq::index::sample;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::agents::defs::Status;
use crate::agents::{AgentStore, Tile};
use crate::disease::Disease;
use crate::error::EpigridError;
use crate::hashing::hash_str;
use crate::log::warn;
use crate::random::{agent_rng, RngStream};

fn set_infected(tile: &mut Tile, d: usize, k: usize, disease: &Disease, rng: &mut SmallRng) {
    let periods = disease.sample_periods(rng);
    let cols = &mut tile.diseases[d];
    cols.status[k] = Status::Infected;
    cols.counter[k] = 0.0;
    cols.latent_period[k] = periods.latent;
    cols.infectious_period[k] = periods.infectious;
    cols.incubation_period[k] = periods.incubation;
}

/// Converts each accumulated survival probability into an infection draw.
/// After this pass the `prob` column holds the day's infection probability.
pub fn infect_agents(store: &mut AgentStore, diseases: &[Disease], base_seed: u64, day: u32) {
    store.par_tiles_mut(|tile| {
        for (d, disease) in diseases.iter().enumerate() {
            let seed = base_seed.wrapping_add(hash_str(disease.name()));
            for k in 0..tile.len() {
                debug_assert!((0.0..=1.0).contains(&tile.diseases[d].prob[k]));
                let p_infect = 1.0 - tile.diseases[d].prob[k];
                tile.diseases[d].prob[k] = p_infect;
                if matches!(
                    tile.diseases[d].status[k],
                    Status::Never | Status::Susceptible
                ) {
                    let mut rng = agent_rng(seed, RngStream::Infection, tile.id[k], day);
                    if rng.random::<f64>() < p_infect {
                        set_infected(tile, d, k, disease, &mut rng);
                    }
                }
            }
        }
    });
}

/// Infects `num_cases` distinct agents chosen uniformly from the population.
pub fn seed_initial_cases_random(
    store: &mut AgentStore,
    diseases: &[Disease],
    d: usize,
    num_cases: usize,
    base_seed: u64,
) -> Result<(), EpigridError> {
    let total = store.num_agents();
    if num_cases > total {
        return Err(EpigridError::BadPopulation(format!(
            "cannot seed {num_cases} initial cases of {} into {total} agents",
            diseases[d].name()
        )));
    }
    let seed = base_seed
        .wrapping_add(hash_str(diseases[d].name()))
        .wrapping_add(RngStream::InitialCases.salt());
    let mut pick_rng = SmallRng::seed_from_u64(seed);
    let mut picks: Vec<usize> = sample(&mut pick_rng, total, num_cases).into_vec();
    picks.sort_unstable();

    // Walk the tiles once, matching global agent offsets against the sorted
    // picks.
    let disease = &diseases[d];
    let mut offset = 0usize;
    let mut next = 0usize;
    for tile in store.tiles_mut() {
        let np = tile.len();
        while next < picks.len() && picks[next] < offset + np {
            let k = picks[next] - offset;
            let mut rng = agent_rng(seed, RngStream::InitialCases, tile.id[k], 0);
            set_infected(tile, d, k, disease, &mut rng);
            next += 1;
        }
        offset += np;
    }
    Ok(())
}

/// Infects agents homed in the given communities: `count` residents per cell,
/// chosen uniformly among that cell's residents. Cells with fewer residents
/// than requested are seeded completely and logged.
pub fn seed_initial_cases(
    store: &mut AgentStore,
    diseases: &[Disease],
    d: usize,
    cases: &[((i32, i32), usize)],
    base_seed: u64,
) -> Result<(), EpigridError> {
    let disease = &diseases[d];
    let seed = base_seed
        .wrapping_add(hash_str(disease.name()))
        .wrapping_add(RngStream::InitialCases.salt());
    for &((i, j), count) in cases {
        if !store.domain().contains(i, j) {
            return Err(EpigridError::BadPopulation(format!(
                "initial case cell ({i}, {j}) outside the domain"
            )));
        }
        let t = store.domain().tile_of_cell(i, j);
        let tile = &mut store.tiles_mut()[t];
        let residents: Vec<usize> = (0..tile.len())
            .filter(|&k| tile.home_i[k] == i && tile.home_j[k] == j)
            .collect();
        let n = count.min(residents.len());
        if n < count {
            warn!(
                "community ({i}, {j}) has {} residents, seeding {n} of {count} requested cases",
                residents.len()
            );
        }
        let mut pick_rng = SmallRng::seed_from_u64(seed.wrapping_add(hash_str(&format!("{i},{j}"))));
        for pick in sample(&mut pick_rng, residents.len(), n) {
            let k = residents[pick];
            let mut rng = agent_rng(seed, RngStream::InitialCases, tile.id[k], 0);
            set_infected(tile, d, k, disease, &mut rng);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::defs::AgeGroup;
    use crate::agents::store::AgentAttributes;
    use crate::disease::DiseaseParams;
    use crate::geom::Domain;
    use crate::stats;

    fn populated_store(n: usize) -> AgentStore {
        let mut store = AgentStore::new(Domain::new(4, 4, 2).unwrap(), 1, false);
        for k in 0..n {
            store
                .push_agent(&AgentAttributes {
                    age_group: AgeGroup::A30to49,
                    family: k as i32,
                    nborhood: 0,
                    home: ((k % 4) as i32, ((k / 4) % 4) as i32),
                    work: None,
                    workgroup: 0,
                    naics: 0,
                    work_nborhood: 0,
                    school_id: 0,
                    school_grade: 0,
                })
                .unwrap();
        }
        store
    }

    fn default_disease() -> Disease {
        Disease::new(DiseaseParams::with_name("test")).unwrap()
    }

    #[test]
    fn certain_infection_flips_status() {
        let mut store = populated_store(3);
        for tile in store.tiles_mut() {
            for k in 0..tile.len() {
                tile.diseases[0].prob[k] = 0.0; // survival zero: infection certain
            }
        }
        let disease = default_disease();
        infect_agents(&mut store, std::slice::from_ref(&disease), 7, 0);
        let totals = stats::status_totals(&store, 0);
        assert_eq!(totals.infected, 3);
        for tile in store.tiles() {
            for k in 0..tile.len() {
                assert_eq!(tile.diseases[0].counter[k], 0.0);
                assert!(tile.diseases[0].latent_period[k] >= 0.0);
                // prob now holds the infection probability
                assert_eq!(tile.diseases[0].prob[k], 1.0);
            }
        }
    }

    #[test]
    fn surviving_probability_one_never_infects() {
        let mut store = populated_store(5);
        let disease = default_disease();
        infect_agents(&mut store, std::slice::from_ref(&disease), 7, 0);
        assert_eq!(stats::status_totals(&store, 0).never, 5);
    }

    #[test]
    fn immune_agents_are_not_redrawn() {
        let mut store = populated_store(1);
        let t = store.domain().tile_of_cell(0, 0);
        let tile = &mut store.tiles_mut()[t];
        tile.diseases[0].status[0] = Status::Immune;
        tile.diseases[0].prob[0] = 0.0;
        let disease = default_disease();
        infect_agents(&mut store, std::slice::from_ref(&disease), 7, 0);
        assert_eq!(stats::status_totals(&store, 0).immune, 1);
    }

    #[test]
    fn random_seeding_is_exact_and_reproducible() {
        let mut a = populated_store(40);
        let mut b = populated_store(40);
        let disease = default_disease();
        seed_initial_cases_random(&mut a, std::slice::from_ref(&disease), 0, 7, 99).unwrap();
        seed_initial_cases_random(&mut b, std::slice::from_ref(&disease), 0, 7, 99).unwrap();
        assert_eq!(stats::status_totals(&a, 0).infected, 7);
        for (ta, tb) in a.tiles().iter().zip(b.tiles()) {
            assert_eq!(ta.diseases[0].status, tb.diseases[0].status);
        }
    }

    #[test]
    fn random_seeding_rejects_overdraw() {
        let mut store = populated_store(3);
        let disease = default_disease();
        assert!(
            seed_initial_cases_random(&mut store, std::slice::from_ref(&disease), 0, 4, 1)
                .is_err()
        );
    }

    #[test]
    fn community_seeding_targets_home_cell() {
        let mut store = populated_store(16);
        let disease = default_disease();
        seed_initial_cases(
            &mut store,
            std::slice::from_ref(&disease),
            0,
            &[((1, 0), 1)],
            7,
        )
        .unwrap();
        for tile in store.tiles() {
            for k in 0..tile.len() {
                let infected = tile.diseases[0].status[k] == Status::Infected;
                if infected {
                    assert_eq!((tile.home_i[k], tile.home_j[k]), (1, 0));
                }
            }
        }
        assert_eq!(stats::status_totals(&store, 0).infected, 1);
    }
}
