//! Hospital treatment: timer countdown, phase-end outcome draws, discharge,
//! and the multi-disease coupling of death.
//!
//! The treatment timer encodes the care level: values above `2 * t_hosp_offset`
//! mean ventilator, values in `[t_hosp_offset, 2 * t_hosp_offset)` mean ICU,
//! positive values below that a regular bed. Each day the timer drops by
//! exactly 1; crossing `2 * t_hosp_offset`, `t_hosp_offset`, or 0 ends the
//! corresponding phase and triggers a single survive-or-die draw.
//!
//! Statistics: a surviving phase end decrements channel `c` for every flag
//! value above `c` (net currently-in-phase bookkeeping); a death records only
//! the death channel and leaves the admission counts in place as cumulative
//! indicators.

use rand::Rng;

use crate::agents::defs::{StatChannel, Status, SymptomStatus};
use crate::agents::AgentStore;
use crate::disease::Disease;
use crate::hashing::hash_str;
use crate::random::{agent_rng, RngStream};
use crate::stats::StatsAccumulator;

pub fn treat_agents(
    store: &mut AgentStore,
    diseases: &[Disease],
    stats: &StatsAccumulator,
    base_seed: u64,
    day: u32,
) {
    let n_diseases = diseases.len();
    store.par_tiles_mut(|tile| {
        let np = tile.len();
        let mut is_alive = vec![true; np];
        // 0: nothing changed today; +-(channel + 1): phase ended (negative
        // on death). Shared across diseases like the admission marks.
        let mut flag_status = vec![0i32; np];

        for k in 0..np {
            let dead = tile.diseases[0].status[k] == Status::Dead;
            is_alive[k] = !dead;
            // death is a global property of the agent
            debug_assert!(tile
                .diseases
                .iter()
                .all(|cols| (cols.status[k] == Status::Dead) == dead));
        }

        for (d, disease) in diseases.iter().enumerate() {
            let seed = base_seed.wrapping_add(hash_str(disease.name()));
            let t_offset = disease.params().t_hosp_offset;
            for k in 0..np {
                if !tile.in_hospital(k) {
                    continue;
                }
                if tile.diseases[d].counter[k] == tile.diseases[d].incubation_period[k].floor() {
                    // admitted today; treatment starts tomorrow
                    continue;
                }
                if tile.diseases[d].treatment_timer[k] == 0.0 {
                    // already recovered or died from this disease
                    continue;
                }
                if !is_alive[k] {
                    continue;
                }
                debug_assert_eq!(tile.diseases[d].status[k], Status::Infected);

                tile.diseases[d].treatment_timer[k] -= 1.0;
                let timer = tile.diseases[d].treatment_timer[k];
                let ended_phase = if timer == 0.0 {
                    Some(StatChannel::Hospitalization)
                } else if timer == t_offset {
                    Some(StatChannel::Icu)
                } else if timer == 2.0 * t_offset {
                    Some(StatChannel::Ventilator)
                } else {
                    None
                };

                if let Some(phase) = ended_phase {
                    let bucket = phase as usize;
                    flag_status[k] = bucket as i32 + 1;
                    let mut rng = agent_rng(seed, RngStream::Hospital, tile.id[k], day);
                    let p_death =
                        disease.params().hosp_to_death[bucket][tile.age_group[k].index()];
                    if rng.random::<f64>() < p_death {
                        is_alive[k] = false;
                        flag_status[k] = -flag_status[k];
                        tile.diseases[d].status[k] = Status::Dead;
                    } else {
                        tile.diseases[d].status[k] = Status::Immune;
                        tile.diseases[d].counter[k] = disease.sample_immune_length(&mut rng);
                        tile.diseases[d].symptomatic[k] = SymptomStatus::Presymptomatic;
                        tile.withdrawn[k] = false;
                        tile.diseases[d].treatment_timer[k] = 0.0;
                    }
                }
            }
        }

        for k in 0..np {
            if !tile.in_hospital(k) {
                continue;
            }
            if !is_alive[k] {
                for cols in &mut tile.diseases {
                    cols.status[k] = Status::Dead;
                }
                tile.hosp_i[k] = -1;
                tile.hosp_j[k] = -1;
                tile.withdrawn[k] = false;
            } else {
                let sum_timers: f64 = tile
                    .diseases
                    .iter()
                    .map(|cols| cols.treatment_timer[k])
                    .sum();
                if sum_timers == 0.0 {
                    // discharge: back home
                    tile.hosp_i[k] = -1;
                    tile.hosp_j[k] = -1;
                    tile.withdrawn[k] = false;
                    tile.pos_i[k] = tile.home_i[k];
                    tile.pos_j[k] = tile.home_j[k];
                }
            }
        }

        for d in 0..n_diseases {
            for k in 0..np {
                let flag = flag_status[k];
                if flag < 0 {
                    stats.add(d, tile.home_i[k], tile.home_j[k], StatChannel::Death, 1);
                } else if flag > 0 {
                    for channel in [
                        StatChannel::Hospitalization,
                        StatChannel::Icu,
                        StatChannel::Ventilator,
                    ] {
                        if flag > channel as i32 {
                            stats.add(d, tile.home_i[k], tile.home_j[k], channel, -1);
                        }
                    }
                }
            }
        }
    });
}
