//! Workgroup interactions during the work day.
//!
//! One tally keyed by `(community, workgroup, naics)`. Transmission is a
//! single scalar per disease, independent of age.

use crate::agents::defs::GroupAttr;
use crate::agents::{AgentStore, CommunityIndex, Tile};
use crate::disease::Disease;
use crate::interaction::survival_factor;

fn is_candidate(tile: &Tile, idx: usize) -> bool {
    !tile.in_hospital(idx)
        && tile.work_i[idx] >= 0
        && tile.workgroup[idx] > 0
        && !tile.withdrawn[idx]
        && tile.air_travel[idx] < 0
        && tile.random_travel[idx] < 0
}

pub fn interact_work(store: &mut AgentStore, diseases: &[Disease]) {
    let max_workgroup = (store.max_group(GroupAttr::Workgroup) + 1) as usize;
    let max_naics = (store.max_group(GroupAttr::Naics) + 1) as usize;

    store.par_tiles_mut(|tile| {
        let comm = CommunityIndex::build(tile);
        let np = tile.len();
        let mut infected_workgroup = vec![0u32; comm.len() * max_workgroup * max_naics];

        for (d, disease) in diseases.iter().enumerate() {
            let infect = disease.infect_factor();
            let scale = disease.params().social_scale;
            let xmit_work = disease.params().xmit_work;

            infected_workgroup.fill(0);

            for k in 0..np {
                if tile.is_infectious(d, k) && is_candidate(tile, k) {
                    let c = comm.of_agent(tile, k);
                    let group = (c * max_workgroup + tile.workgroup[k] as usize) * max_naics
                        + tile.naics[k] as usize;
                    infected_workgroup[group] += 1;
                }
            }

            for k in 0..np {
                if !tile.is_susceptible(d, k) || !is_candidate(tile, k) {
                    continue;
                }
                let c = comm.of_agent(tile, k);
                let group = (c * max_workgroup + tile.workgroup[k] as usize) * max_naics
                    + tile.naics[k] as usize;
                tile.diseases[d].prob[k] *=
                    survival_factor(infect, xmit_work, scale, infected_workgroup[group]);
            }
        }
    });
}
