//! Household and family-cluster interactions.
//!
//! Three tallies per tile: infectious per `(community, family)`, the
//! not-withdrawn subset of the same, and not-withdrawn infectious per
//! `(community, nborhood, cluster)` where a cluster is
//! [`FAMILIES_PER_CLUSTER`] consecutive families. The family term applies to
//! everyone home; the cluster term applies only when neither end has
//! withdrawn, with the agent's own family's not-withdrawn count subtracted
//! from the cluster count so family contacts are not double-counted.

use crate::agents::defs::{GroupAttr, FAMILIES_PER_CLUSTER};
use crate::agents::{AgentStore, CommunityIndex, Tile};
use crate::disease::Disease;
use crate::interaction::survival_factor;

fn is_candidate(tile: &Tile, idx: usize) -> bool {
    !tile.in_hospital(idx) && tile.random_travel[idx] < 0 && tile.air_travel[idx] < 0
}

pub fn interact_home(store: &mut AgentStore, diseases: &[Disease], schools_closed: bool) {
    let max_family = (store.max_group(GroupAttr::Family) + 1) as usize;
    let max_nborhood = (store.max_group(GroupAttr::Nborhood) + 1) as usize;
    let num_ncs = max_family / FAMILIES_PER_CLUSTER as usize + 1;

    store.par_tiles_mut(|tile| {
        let comm = CommunityIndex::build(tile);
        let np = tile.len();
        let mut infected_family = vec![0u32; comm.len() * max_family];
        let mut infected_family_not_withdrawn = vec![0u32; comm.len() * max_family];
        let mut infected_nc = vec![0u32; comm.len() * max_nborhood * num_ncs];

        for (d, disease) in diseases.iter().enumerate() {
            let tables = disease.home_tables(schools_closed);
            let infect = disease.infect_factor();
            let scale = disease.params().social_scale;

            // Transmission differs by transmitter age, so tally and apply
            // adults and children separately.
            for adults in [true, false] {
                infected_family.fill(0);
                infected_family_not_withdrawn.fill(0);
                infected_nc.fill(0);

                for k in 0..np {
                    if tile.is_infectious(d, k)
                        && is_candidate(tile, k)
                        && tile.is_adult(k) == adults
                    {
                        let c = comm.of_agent(tile, k);
                        let family = c * max_family + tile.family[k] as usize;
                        infected_family[family] += 1;
                        if !tile.withdrawn[k] {
                            infected_family_not_withdrawn[family] += 1;
                            let cluster = (tile.family[k] / FAMILIES_PER_CLUSTER) as usize;
                            let nc = (c * max_nborhood + tile.nborhood[k] as usize) * num_ncs
                                + cluster;
                            infected_nc[nc] += 1;
                        }
                    }
                }

                let (xmit_family, xmit_nc) = if adults {
                    (&tables.hh_adult, &tables.nc_adult)
                } else {
                    (&tables.hh_child, &tables.nc_child)
                };

                for k in 0..np {
                    if !tile.is_susceptible(d, k) || !is_candidate(tile, k) {
                        continue;
                    }
                    let age = tile.age_group[k].index();
                    let c = comm.of_agent(tile, k);
                    let family = c * max_family + tile.family[k] as usize;
                    let num_infected_family = infected_family[family];
                    tile.diseases[d].prob[k] *=
                        survival_factor(infect, xmit_family[age], scale, num_infected_family);
                    if !tile.withdrawn[k] {
                        let num_not_withdrawn = infected_family_not_withdrawn[family];
                        debug_assert!(num_infected_family >= num_not_withdrawn);
                        let cluster = (tile.family[k] / FAMILIES_PER_CLUSTER) as usize;
                        let nc =
                            (c * max_nborhood + tile.nborhood[k] as usize) * num_ncs + cluster;
                        // Outer minus inner: family members were already
                        // handled by the family term.
                        debug_assert!(infected_nc[nc] >= num_not_withdrawn);
                        let num_infected_nc = infected_nc[nc].saturating_sub(num_not_withdrawn);
                        tile.diseases[d].prob[k] *=
                            survival_factor(infect, xmit_nc[age], scale, num_infected_nc);
                    }
                }
            }
        }
    });
}
