//! Daily disease progression and hospital admission.
//!
//! For each disease the per-agent state machine advances one day: immunity
//! counts down toward susceptibility, infections tick through symptom onset
//! and recovery, and freshly symptomatic agents may be marked for admission.
//! Admission marks are shared across diseases within the day: an agent marked
//! by one disease is hospitalized once (at its home community, unless another
//! disease already hospitalized it) and every disease's community statistics
//! are incremented by the same marks.

use rand::Rng;

use crate::agents::defs::{StatChannel, Status, SymptomStatus};
use crate::agents::AgentStore;
use crate::disease::Disease;
use crate::hashing::hash_str;
use crate::random::{agent_rng, RngStream};
use crate::stats::StatsAccumulator;

pub fn update_agents(
    store: &mut AgentStore,
    diseases: &[Disease],
    stats: &StatsAccumulator,
    symptomatic_withdraw_compliance: f64,
    base_seed: u64,
    day: u32,
) {
    store.par_tiles_mut(|tile| {
        let np = tile.len();
        let mut marked_for_hosp = vec![false; np];
        let mut marked_for_icu = vec![false; np];
        let mut marked_for_vent = vec![false; np];

        for (d, disease) in diseases.iter().enumerate() {
            let seed = base_seed.wrapping_add(hash_str(disease.name()));
            for k in 0..np {
                tile.diseases[d].prob[k] = 1.0;
                match tile.diseases[d].status[k] {
                    Status::Never | Status::Susceptible | Status::Dead => {}
                    Status::Immune => {
                        tile.diseases[d].counter[k] -= 1.0;
                        if tile.diseases[d].counter[k] < 0.0 {
                            tile.diseases[d].counter[k] = 0.0;
                            tile.diseases[d].treatment_timer[k] = 0.0;
                            tile.diseases[d].status[k] = Status::Susceptible;
                        }
                    }
                    Status::Infected => {
                        tile.diseases[d].counter[k] += 1.0;
                        let counter = tile.diseases[d].counter[k];
                        if counter == 1.0 {
                            // just infected; decide if this case stays silent
                            let mut rng = agent_rng(seed, RngStream::Progression, tile.id[k], day);
                            tile.diseases[d].symptomatic[k] =
                                if rng.random::<f64>() < disease.params().p_asymp {
                                    SymptomStatus::Asymptomatic
                                } else {
                                    SymptomStatus::Presymptomatic
                                };
                        } else if counter == tile.diseases[d].incubation_period[k].floor() {
                            debug_assert!(
                                tile.diseases[d].symptomatic[k] != SymptomStatus::Symptomatic
                            );
                            if tile.diseases[d].symptomatic[k] == SymptomStatus::Presymptomatic {
                                tile.diseases[d].symptomatic[k] = SymptomStatus::Symptomatic;
                                let mut rng =
                                    agent_rng(seed, RngStream::Progression, tile.id[k], day);
                                if symptomatic_withdraw_compliance > 0.0
                                    && rng.random::<f64>() < symptomatic_withdraw_compliance
                                {
                                    tile.withdrawn[k] = true;
                                }
                                let draw =
                                    disease.check_hospitalization(tile.age_group[k], &mut rng);
                                tile.diseases[d].treatment_timer[k] = draw.timer;
                                if draw.icu {
                                    marked_for_icu[k] = true;
                                }
                                if draw.ventilator {
                                    marked_for_vent[k] = true;
                                }
                                if draw.timer > 0.0 {
                                    marked_for_hosp[k] = true;
                                }
                            }
                        } else if !tile.in_hospital(k) {
                            let recovery = tile.diseases[d].latent_period[k]
                                + tile.diseases[d].infectious_period[k];
                            if counter >= recovery {
                                let mut rng =
                                    agent_rng(seed, RngStream::Progression, tile.id[k], day);
                                tile.diseases[d].status[k] = Status::Immune;
                                tile.diseases[d].counter[k] =
                                    disease.sample_immune_length(&mut rng);
                                tile.diseases[d].symptomatic[k] = SymptomStatus::Presymptomatic;
                                tile.withdrawn[k] = false;
                            }
                        }
                    }
                }
            }
        }

        // An agent could already hold a hospital assignment from another
        // disease; the first assignment wins.
        for k in 0..np {
            if marked_for_hosp[k] && !tile.in_hospital(k) {
                tile.hosp_i[k] = tile.home_i[k];
                tile.hosp_j[k] = tile.home_j[k];
            }
        }

        for d in 0..diseases.len() {
            for k in 0..np {
                if marked_for_hosp[k] {
                    stats.add(
                        d,
                        tile.home_i[k],
                        tile.home_j[k],
                        StatChannel::Hospitalization,
                        1,
                    );
                }
                if marked_for_icu[k] {
                    stats.add(d, tile.home_i[k], tile.home_j[k], StatChannel::Icu, 1);
                }
                if marked_for_vent[k] {
                    stats.add(d, tile.home_i[k], tile.home_j[k], StatChannel::Ventilator, 1);
                }
            }
        }
    });
}
