//! Daytime neighborhood and community interactions around the workplace.
//!
//! Same outer/inner structure as the home variant, but the neighborhood of an
//! adult is its `work_nborhood` while children keep their home `nborhood`
//! (children present in a community during the work day, e.g. daycare kids,
//! cluster by where they live).

use crate::agents::defs::GroupAttr;
use crate::agents::{AgentStore, CommunityIndex, Tile};
use crate::disease::Disease;
use crate::interaction::survival_factor;

fn is_candidate(tile: &Tile, idx: usize) -> bool {
    !tile.in_hospital(idx) && !tile.withdrawn[idx] && tile.random_travel[idx] < 0
}

fn day_nborhood(tile: &Tile, idx: usize) -> usize {
    if tile.is_adult(idx) {
        tile.work_nborhood[idx] as usize
    } else {
        tile.nborhood[idx] as usize
    }
}

pub fn interact_work_nborhood(
    store: &mut AgentStore,
    diseases: &[Disease],
    schools_closed: bool,
) {
    let max_nborhood = (store
        .max_group(GroupAttr::WorkNborhood)
        .max(store.max_group(GroupAttr::Nborhood))
        + 1) as usize;

    store.par_tiles_mut(|tile| {
        let comm = CommunityIndex::build(tile);
        let np = tile.len();
        let mut infected_community = vec![0u32; comm.len()];
        let mut infected_nborhood = vec![0u32; comm.len() * max_nborhood];

        for (d, disease) in diseases.iter().enumerate() {
            let tables = disease.home_tables(schools_closed);
            let infect = disease.infect_factor();
            let scale = disease.params().social_scale;

            infected_community.fill(0);
            infected_nborhood.fill(0);

            for k in 0..np {
                if tile.is_infectious(d, k) && is_candidate(tile, k) {
                    let c = comm.of_agent(tile, k);
                    infected_community[c] += 1;
                    infected_nborhood[c * max_nborhood + day_nborhood(tile, k)] += 1;
                }
            }

            for k in 0..np {
                if !tile.is_susceptible(d, k) || !is_candidate(tile, k) {
                    continue;
                }
                let age = tile.age_group[k].index();
                let c = comm.of_agent(tile, k);
                let num_in_nborhood = infected_nborhood[c * max_nborhood + day_nborhood(tile, k)];
                let num_in_community = infected_community[c];
                debug_assert!(num_in_community >= num_in_nborhood);
                tile.diseases[d].prob[k] *= survival_factor(
                    infect,
                    tables.comm[age],
                    scale,
                    num_in_community - num_in_nborhood,
                );
                tile.diseases[d].prob[k] *=
                    survival_factor(infect, tables.hood[age], scale, num_in_nborhood);
            }
        }
    });
}
