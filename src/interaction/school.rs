//! School interactions, keyed by `(community, school_id, school_grade)`.
//!
//! Daycare grades and regular school grades keep separate tallies: daycare
//! transmission is one rate regardless of who transmits, while the other
//! school types distinguish adult<->child directions (teachers carry the
//! grade they teach).

use crate::agents::defs::{school_type_of_grade, GroupAttr, SchoolType};
use crate::agents::{AgentStore, CommunityIndex, Tile};
use crate::disease::Disease;
use crate::interaction::survival_factor;

fn is_candidate(tile: &Tile, idx: usize) -> bool {
    !tile.in_hospital(idx)
        && tile.school_id[idx] > 0
        && !tile.school_closed[idx]
        && !tile.withdrawn[idx]
        && tile.air_travel[idx] < 0
        && tile.random_travel[idx] < 0
}

pub fn interact_school(store: &mut AgentStore, diseases: &[Disease]) {
    let max_school_id = (store.max_group(GroupAttr::SchoolId) + 1) as usize;
    let max_school_grade = (store.max_group(GroupAttr::SchoolGrade) + 1) as usize;

    store.par_tiles_mut(|tile| {
        let comm = CommunityIndex::build(tile);
        let np = tile.len();
        let counters = comm.len() * max_school_id * max_school_grade;
        let mut infected_school = vec![0u32; counters];
        let mut infected_daycare = vec![0u32; counters];

        for (d, disease) in diseases.iter().enumerate() {
            let params = disease.params();
            let infect = disease.infect_factor();
            let scale = params.social_scale;

            for adults in [true, false] {
                infected_school.fill(0);
                infected_daycare.fill(0);

                for k in 0..np {
                    if tile.is_infectious(d, k)
                        && is_candidate(tile, k)
                        && tile.is_adult(k) == adults
                    {
                        let c = comm.of_agent(tile, k);
                        let grade = tile.school_grade[k];
                        let group = (c * max_school_id + tile.school_id[k] as usize)
                            * max_school_grade
                            + grade as usize;
                        if school_type_of_grade(grade) == SchoolType::Daycare {
                            infected_daycare[group] += 1;
                        } else {
                            infected_school[group] += 1;
                        }
                    }
                }

                for k in 0..np {
                    if !tile.is_susceptible(d, k) || !is_candidate(tile, k) {
                        continue;
                    }
                    let c = comm.of_agent(tile, k);
                    let grade = tile.school_grade[k];
                    let group = (c * max_school_id + tile.school_id[k] as usize)
                        * max_school_grade
                        + grade as usize;
                    let school_type = school_type_of_grade(grade);
                    if school_type == SchoolType::Daycare {
                        tile.diseases[d].prob[k] *= survival_factor(
                            infect,
                            params.xmit_school[SchoolType::Daycare.index()],
                            scale,
                            infected_daycare[group],
                        );
                    } else {
                        let receiver_is_child = !tile.is_adult(k);
                        let xmit = match (adults, receiver_is_child) {
                            // adult teacher/staff -> child student
                            (true, true) => params.xmit_school_a2c[school_type.index()],
                            (true, false) => params.xmit_school[school_type.index()],
                            (false, true) => params.xmit_school[school_type.index()],
                            // child student -> adult teacher/staff
                            (false, false) => params.xmit_school_c2a[school_type.index()],
                        };
                        tile.diseases[d].prob[k] *=
                            survival_factor(infect, xmit, scale, infected_school[group]);
                    }
                }
            }
        }
    });
}
