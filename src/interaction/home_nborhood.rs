//! Evening neighborhood and community interactions around home.
//!
//! Two tallies: infectious per community and infectious per
//! `(community, nborhood)`. A susceptible takes the neighborhood rate for
//! infectious agents sharing its neighborhood and the community rate for the
//! rest of the community (outer count minus neighborhood count). This is the
//! one model where random travellers participate, at their current location.

use crate::agents::defs::GroupAttr;
use crate::agents::{AgentStore, CommunityIndex, Tile};
use crate::disease::Disease;
use crate::interaction::survival_factor;

fn is_candidate(tile: &Tile, idx: usize) -> bool {
    !tile.in_hospital(idx) && !tile.withdrawn[idx]
}

pub fn interact_home_nborhood(store: &mut AgentStore, diseases: &[Disease], schools_closed: bool) {
    let max_nborhood = (store.max_group(GroupAttr::Nborhood) + 1) as usize;

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
                    infected_nborhood[c * max_nborhood + tile.nborhood[k] as usize] += 1;
                }
            }

            for k in 0..np {
                if !tile.is_susceptible(d, k) || !is_candidate(tile, k) {
                    continue;
                }
                let age = tile.age_group[k].index();
                let c = comm.of_agent(tile, k);
                let num_in_nborhood = infected_nborhood[c * max_nborhood + tile.nborhood[k] as usize];
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
