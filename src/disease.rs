//! Per-disease parameters and the stochastic draws derived from them.
//!
//! [`DiseaseParams`] is the raw, serde-loadable parameter block with built-in
//! defaults; [`Disease`] is the validated form the kernels consume, with the
//! Gamma distributions for the disease periods pre-built and the
//! school-closure contact-table variants resolved.

use rand::rngs::SmallRng;
use rand::Rng;
use rand_distr::{Distribution, Gamma};
use serde::{Deserialize, Serialize};

use crate::agents::defs::{AgeGroup, NUM_AGE_GROUPS, NUM_HOSP_AGE_GROUPS, NUM_SCHOOL_TYPES};
use crate::error::EpigridError;

fn default_xmit_comm() -> [f64; NUM_AGE_GROUPS] {
    [
        0.000018125,
        0.000054375,
        0.000145,
        0.000145,
        0.000145,
        0.0002175,
    ]
}

fn default_xmit_hood() -> [f64; NUM_AGE_GROUPS] {
    [0.0000725, 0.0002175, 0.00058, 0.00058, 0.00058, 0.00087]
}

fn default_xmit_hh_adult() -> [f64; NUM_AGE_GROUPS] {
    [0.3, 0.3, 0.4, 0.4, 0.4, 0.4]
}

fn default_xmit_hh_child() -> [f64; NUM_AGE_GROUPS] {
    [0.6, 0.6, 0.3, 0.3, 0.3, 0.3]
}

fn default_xmit_nc_adult() -> [f64; NUM_AGE_GROUPS] {
    [0.04, 0.04, 0.05, 0.05, 0.05, 0.05]
}

fn default_xmit_nc_child() -> [f64; NUM_AGE_GROUPS] {
    [0.075, 0.075, 0.04, 0.04, 0.04, 0.04]
}

fn default_xmit_school() -> [f64; NUM_SCHOOL_TYPES] {
    [0.0, 0.0315, 0.0315, 0.0375, 0.0435, 0.15]
}

fn default_t_hosp() -> [f64; NUM_HOSP_AGE_GROUPS] {
    [3.0, 8.0, 7.0]
}

fn default_chr() -> [f64; NUM_AGE_GROUPS] {
    [0.0104, 0.0104, 0.070, 0.28, 0.28, 1.0]
}

fn default_cic() -> [f64; NUM_AGE_GROUPS] {
    [0.24, 0.24, 0.24, 0.36, 0.36, 0.35]
}

fn default_cve() -> [f64; NUM_AGE_GROUPS] {
    [0.12, 0.12, 0.12, 0.22, 0.22, 0.22]
}

fn default_hosp_to_death() -> [[f64; NUM_AGE_GROUPS]; NUM_HOSP_AGE_GROUPS] {
    [
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.26],
        [0.20, 0.20, 0.20, 0.45, 0.45, 1.0],
    ]
}

fn one() -> f64 {
    1.0
}

/// The raw parameter block for one disease. Every field has the model's
/// built-in default, so a configuration file only lists what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiseaseParams {
    pub name: String,

    /// Number of randomly seeded initial cases.
    #[serde(default)]
    pub num_initial_cases: usize,

    /// Probability of transmission given contact.
    #[serde(default = "default_p_trans")]
    pub p_trans: f64,
    /// Fraction of cases that are asymptomatic.
    #[serde(default = "default_p_asymp")]
    pub p_asymp: f64,
    /// Relative infectiousness of asymptomatic individuals.
    #[serde(default = "default_asymp_relative_inf")]
    pub asymp_relative_inf: f64,
    /// Vaccine efficacy.
    #[serde(default)]
    pub vac_eff: f64,

    // Transmission probabilities indexed by the age group of the receiver.
    #[serde(default = "default_xmit_comm")]
    pub xmit_comm: [f64; NUM_AGE_GROUPS],
    #[serde(default = "default_xmit_hood")]
    pub xmit_hood: [f64; NUM_AGE_GROUPS],
    #[serde(default = "default_xmit_hh_adult")]
    pub xmit_hh_adult: [f64; NUM_AGE_GROUPS],
    #[serde(default = "default_xmit_hh_child")]
    pub xmit_hh_child: [f64; NUM_AGE_GROUPS],
    #[serde(default = "default_xmit_nc_adult")]
    pub xmit_nc_adult: [f64; NUM_AGE_GROUPS],
    #[serde(default = "default_xmit_nc_child")]
    pub xmit_nc_child: [f64; NUM_AGE_GROUPS],

    // Variants in effect while schools are closed. When not given they fall
    // back to the open-school values.
    #[serde(default)]
    pub xmit_comm_sc: Option<[f64; NUM_AGE_GROUPS]>,
    #[serde(default)]
    pub xmit_hood_sc: Option<[f64; NUM_AGE_GROUPS]>,
    #[serde(default)]
    pub xmit_hh_adult_sc: Option<[f64; NUM_AGE_GROUPS]>,
    #[serde(default)]
    pub xmit_hh_child_sc: Option<[f64; NUM_AGE_GROUPS]>,
    #[serde(default)]
    pub xmit_nc_adult_sc: Option<[f64; NUM_AGE_GROUPS]>,
    #[serde(default)]
    pub xmit_nc_child_sc: Option<[f64; NUM_AGE_GROUPS]>,

    // School transmission by school type: none, college, high, middle,
    // elementary, daycare.
    #[serde(default = "default_xmit_school")]
    pub xmit_school: [f64; NUM_SCHOOL_TYPES],
    #[serde(default = "default_xmit_school")]
    pub xmit_school_a2c: [f64; NUM_SCHOOL_TYPES],
    #[serde(default = "default_xmit_school")]
    pub xmit_school_c2a: [f64; NUM_SCHOOL_TYPES],

    /// Workgroup transmission, independent of age group.
    #[serde(default = "default_xmit_work")]
    pub xmit_work: f64,

    #[serde(default = "default_immune_alpha")]
    pub immune_length_alpha: f64,
    #[serde(default = "default_immune_beta")]
    pub immune_length_beta: f64,
    #[serde(default = "default_latent_alpha")]
    pub latent_length_alpha: f64,
    #[serde(default = "default_latent_beta")]
    pub latent_length_beta: f64,
    #[serde(default = "default_infectious_alpha")]
    pub infectious_length_alpha: f64,
    #[serde(default = "default_infectious_beta")]
    pub infectious_length_beta: f64,
    #[serde(default = "default_incubation_alpha")]
    pub incubation_length_alpha: f64,
    #[serde(default = "default_incubation_beta")]
    pub incubation_length_beta: f64,

    /// Hospitalization days by hospitalization age bucket (under 50, 50-64,
    /// 65+), *not* the six-way age groups used elsewhere.
    #[serde(default = "default_t_hosp")]
    pub t_hosp: [f64; NUM_HOSP_AGE_GROUPS],
    /// Offset separating the hospital / ICU / ventilator regions of the
    /// treatment timer; must exceed `max(t_hosp)`.
    #[serde(default = "default_t_hosp_offset")]
    pub t_hosp_offset: f64,

    /// Sick -> hospital probabilities by age group.
    #[serde(default = "default_chr")]
    pub chr: [f64; NUM_AGE_GROUPS],
    /// Hospital -> ICU probabilities by age group.
    #[serde(default = "default_cic")]
    pub cic: [f64; NUM_AGE_GROUPS],
    /// ICU -> ventilator probabilities by age group.
    #[serde(default = "default_cve")]
    pub cve: [f64; NUM_AGE_GROUPS],
    /// Probability of dying at the end of each treatment phase (hospital,
    /// ICU, ventilator) by age group.
    #[serde(default = "default_hosp_to_death")]
    pub hosp_to_death: [[f64; NUM_AGE_GROUPS]; NUM_HOSP_AGE_GROUPS],

    /// Global scale on all interaction terms.
    #[serde(default = "one")]
    pub social_scale: f64,
}

fn default_p_trans() -> f64 {
    0.20
}
fn default_p_asymp() -> f64 {
    0.40
}
fn default_asymp_relative_inf() -> f64 {
    0.75
}
fn default_xmit_work() -> f64 {
    0.0575
}
fn default_immune_alpha() -> f64 {
    9.0
}
fn default_immune_beta() -> f64 {
    20.0
}
fn default_latent_alpha() -> f64 {
    9.0
}
fn default_latent_beta() -> f64 {
    0.33
}
fn default_infectious_alpha() -> f64 {
    36.0
}
fn default_infectious_beta() -> f64 {
    0.17
}
fn default_incubation_alpha() -> f64 {
    25.0
}
fn default_incubation_beta() -> f64 {
    0.2
}
fn default_t_hosp_offset() -> f64 {
    10.0
}

impl DiseaseParams {
    /// A parameter block with all defaults, for tests and seeding.
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        serde_json::from_value(serde_json::json!({ "name": name }))
            .expect("default parameter block is well-formed")
    }

    /// Fails on any out-of-range probability, non-positive Gamma parameter,
    /// or a hospital timer offset that would make treatment phase boundaries
    /// ambiguous.
    pub fn validate(&self) -> Result<(), EpigridError> {
        let check_prob = |label: &str, v: f64| -> Result<(), EpigridError> {
            if !(0.0..=1.0).contains(&v) {
                return Err(EpigridError::BadConfig(format!(
                    "{}: {label} = {v} outside [0, 1]",
                    self.name
                )));
            }
            Ok(())
        };
        let check_probs = |label: &str, vs: &[f64]| -> Result<(), EpigridError> {
            for &v in vs {
                check_prob(label, v)?;
            }
            Ok(())
        };

        check_prob("p_trans", self.p_trans)?;
        check_prob("p_asymp", self.p_asymp)?;
        check_prob("asymp_relative_inf", self.asymp_relative_inf)?;
        check_prob("vac_eff", self.vac_eff)?;
        check_probs("xmit_comm", &self.xmit_comm)?;
        check_probs("xmit_hood", &self.xmit_hood)?;
        check_probs("xmit_hh_adult", &self.xmit_hh_adult)?;
        check_probs("xmit_hh_child", &self.xmit_hh_child)?;
        check_probs("xmit_nc_adult", &self.xmit_nc_adult)?;
        check_probs("xmit_nc_child", &self.xmit_nc_child)?;
        for (label, table) in [
            ("xmit_comm_sc", &self.xmit_comm_sc),
            ("xmit_hood_sc", &self.xmit_hood_sc),
            ("xmit_hh_adult_sc", &self.xmit_hh_adult_sc),
            ("xmit_hh_child_sc", &self.xmit_hh_child_sc),
            ("xmit_nc_adult_sc", &self.xmit_nc_adult_sc),
            ("xmit_nc_child_sc", &self.xmit_nc_child_sc),
        ] {
            if let Some(values) = table {
                check_probs(label, values)?;
            }
        }
        check_probs("xmit_school", &self.xmit_school)?;
        check_probs("xmit_school_a2c", &self.xmit_school_a2c)?;
        check_probs("xmit_school_c2a", &self.xmit_school_c2a)?;
        check_prob("xmit_work", self.xmit_work)?;
        check_probs("chr", &self.chr)?;
        check_probs("cic", &self.cic)?;
        check_probs("cve", &self.cve)?;
        for row in &self.hosp_to_death {
            check_probs("hosp_to_death", row)?;
        }

        for (label, v) in [
            ("immune_length_alpha", self.immune_length_alpha),
            ("immune_length_beta", self.immune_length_beta),
            ("latent_length_alpha", self.latent_length_alpha),
            ("latent_length_beta", self.latent_length_beta),
            ("infectious_length_alpha", self.infectious_length_alpha),
            ("infectious_length_beta", self.infectious_length_beta),
            ("incubation_length_alpha", self.incubation_length_alpha),
            ("incubation_length_beta", self.incubation_length_beta),
        ] {
            if v <= 0.0 {
                return Err(EpigridError::BadConfig(format!(
                    "{}: {label} = {v} must be positive",
                    self.name
                )));
            }
        }

        let max_t_hosp = self.t_hosp.iter().fold(f64::MIN, |a, &b| a.max(b));
        if max_t_hosp <= 0.0 {
            return Err(EpigridError::BadConfig(format!(
                "{}: hospitalization days must be positive",
                self.name
            )));
        }
        if self.t_hosp_offset <= max_t_hosp {
            return Err(EpigridError::BadConfig(format!(
                "{}: t_hosp_offset ({}) must exceed max hospitalization days ({max_t_hosp})",
                self.name, self.t_hosp_offset
            )));
        }
        if self.social_scale < 0.0 || self.social_scale > 1.0 {
            return Err(EpigridError::BadConfig(format!(
                "{}: social_scale outside [0, 1]",
                self.name
            )));
        }
        Ok(())
    }
}

/// Transmission tables used by the home and neighborhood kernels, one set for
/// open schools and one for closed.
#[derive(Debug, Clone)]
pub struct HomeContactTables {
    pub comm: [f64; NUM_AGE_GROUPS],
    pub hood: [f64; NUM_AGE_GROUPS],
    pub hh_adult: [f64; NUM_AGE_GROUPS],
    pub hh_child: [f64; NUM_AGE_GROUPS],
    pub nc_adult: [f64; NUM_AGE_GROUPS],
    pub nc_child: [f64; NUM_AGE_GROUPS],
}

/// Sampled disease periods for a new infection.
#[derive(Debug, Clone, Copy)]
pub struct DiseasePeriods {
    pub latent: f64,
    pub infectious: f64,
    pub incubation: f64,
}

/// Outcome of the hospitalization check at symptom onset.
#[derive(Debug, Clone, Copy, Default)]
pub struct HospitalizationDraw {
    pub timer: f64,
    pub icu: bool,
    pub ventilator: bool,
}

/// A validated disease: raw parameters plus pre-built distributions and
/// resolved contact tables.
pub struct Disease {
    params: DiseaseParams,
    open_tables: HomeContactTables,
    closed_tables: HomeContactTables,
    latent: Gamma<f64>,
    infectious: Gamma<f64>,
    incubation: Gamma<f64>,
    immune: Gamma<f64>,
}

fn gamma(label: &str, name: &str, alpha: f64, beta: f64) -> Result<Gamma<f64>, EpigridError> {
    Gamma::new(alpha, beta).map_err(|e| {
        EpigridError::BadConfig(format!(
            "{name}: bad {label} Gamma parameters ({alpha}, {beta}): {e}"
        ))
    })
}

impl Disease {
    pub fn new(params: DiseaseParams) -> Result<Self, EpigridError> {
        params.validate()?;
        let open_tables = HomeContactTables {
            comm: params.xmit_comm,
            hood: params.xmit_hood,
            hh_adult: params.xmit_hh_adult,
            hh_child: params.xmit_hh_child,
            nc_adult: params.xmit_nc_adult,
            nc_child: params.xmit_nc_child,
        };
        let closed_tables = HomeContactTables {
            comm: params.xmit_comm_sc.unwrap_or(params.xmit_comm),
            hood: params.xmit_hood_sc.unwrap_or(params.xmit_hood),
            hh_adult: params.xmit_hh_adult_sc.unwrap_or(params.xmit_hh_adult),
            hh_child: params.xmit_hh_child_sc.unwrap_or(params.xmit_hh_child),
            nc_adult: params.xmit_nc_adult_sc.unwrap_or(params.xmit_nc_adult),
            nc_child: params.xmit_nc_child_sc.unwrap_or(params.xmit_nc_child),
        };
        let latent = gamma(
            "latent",
            &params.name,
            params.latent_length_alpha,
            params.latent_length_beta,
        )?;
        let infectious = gamma(
            "infectious",
            &params.name,
            params.infectious_length_alpha,
            params.infectious_length_beta,
        )?;
        let incubation = gamma(
            "incubation",
            &params.name,
            params.incubation_length_alpha,
            params.incubation_length_beta,
        )?;
        let immune = gamma(
            "immune",
            &params.name,
            params.immune_length_alpha,
            params.immune_length_beta,
        )?;
        Ok(Disease {
            params,
            open_tables,
            closed_tables,
            latent,
            infectious,
            incubation,
            immune,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.params.name
    }

    #[must_use]
    pub fn params(&self) -> &DiseaseParams {
        &self.params
    }

    /// Infection probability reduction from vaccination; the `infect` term of
    /// every interaction factor.
    #[must_use]
    pub fn infect_factor(&self) -> f64 {
        1.0 - self.params.vac_eff
    }

    #[must_use]
    pub fn home_tables(&self, school_closed: bool) -> &HomeContactTables {
        if school_closed {
            &self.closed_tables
        } else {
            &self.open_tables
        }
    }

    /// Samples the three disease periods for a fresh infection. Periods are
    /// clamped to be non-negative and the incubation period never exceeds
    /// `latent + infectious`.
    pub fn sample_periods(&self, rng: &mut SmallRng) -> DiseasePeriods {
        let latent = self.latent.sample(rng).max(0.0);
        let infectious = self.infectious.sample(rng).max(0.0);
        let mut incubation = self.incubation.sample(rng).max(0.0);
        if incubation > latent + infectious {
            incubation = (latent + infectious).floor();
        }
        DiseasePeriods {
            latent,
            infectious,
            incubation,
        }
    }

    /// Samples the length of post-infection immunity in days.
    pub fn sample_immune_length(&self, rng: &mut SmallRng) -> f64 {
        self.immune.sample(rng)
    }

    /// Given an age group, decide if the agent is hospitalized; if so,
    /// compute the treatment timer and whether the stay escalates to ICU and
    /// ventilator (each escalation adds `t_hosp_offset` to the timer).
    pub fn check_hospitalization(
        &self,
        age_group: AgeGroup,
        rng: &mut SmallRng,
    ) -> HospitalizationDraw {
        let mut draw = HospitalizationDraw::default();
        if rng.random::<f64>() < self.params.chr[age_group.index()] {
            draw.timer = self.params.t_hosp[age_group.hosp_group().index()];
            if rng.random::<f64>() < self.params.cic[age_group.index()] {
                draw.timer += self.params.t_hosp_offset;
                draw.icu = true;
                if rng.random::<f64>() < self.params.cve[age_group.index()] {
                    draw.timer += self.params.t_hosp_offset;
                    draw.ventilator = true;
                }
            }
        }
        draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{agent_rng, RngStream};

    #[test]
    fn default_block_is_valid() {
        let params = DiseaseParams::with_name("default");
        assert!(params.validate().is_ok());
        assert_eq!(params.xmit_hh_child[0], 0.6);
        assert_eq!(params.t_hosp_offset, 10.0);
    }

    #[test]
    fn rejects_probability_out_of_range() {
        let mut params = DiseaseParams::with_name("bad");
        params.xmit_hood[2] = 1.5;
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_nonpositive_gamma() {
        let mut params = DiseaseParams::with_name("bad");
        params.latent_length_alpha = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_ambiguous_hospital_offset() {
        let mut params = DiseaseParams::with_name("bad");
        params.t_hosp_offset = 8.0; // not > max(t_hosp) = 8
        assert!(params.validate().is_err());
    }

    #[test]
    fn json_overrides_merge_with_defaults() {
        let params: DiseaseParams = serde_json::from_str(
            r#"{ "name": "alpha", "vac_eff": 0.5, "num_initial_cases": 3 }"#,
        )
        .unwrap();
        assert_eq!(params.vac_eff, 0.5);
        assert_eq!(params.num_initial_cases, 3);
        assert_eq!(params.p_trans, 0.20);
        let disease = Disease::new(params).unwrap();
        assert_eq!(disease.infect_factor(), 0.5);
    }

    #[test]
    fn unknown_field_is_fatal() {
        let result: Result<DiseaseParams, _> =
            serde_json::from_str(r#"{ "name": "x", "xmit_houde": [0,0,0,0,0,0] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn sc_tables_fall_back_to_open() {
        let mut params = DiseaseParams::with_name("d");
        params.xmit_hood_sc = Some([0.0; 6]);
        let disease = Disease::new(params).unwrap();
        assert_eq!(disease.home_tables(true).hood, [0.0; 6]);
        assert_eq!(
            disease.home_tables(true).comm,
            disease.home_tables(false).comm
        );
    }

    #[test]
    fn sampled_periods_are_consistent() {
        let disease = Disease::new(DiseaseParams::with_name("d")).unwrap();
        for agent in 0..200u64 {
            let mut rng = agent_rng(1, RngStream::Infection, agent, 0);
            let p = disease.sample_periods(&mut rng);
            assert!(p.latent >= 0.0);
            assert!(p.infectious >= 0.0);
            assert!(p.incubation >= 0.0);
            assert!(p.incubation <= p.latent + p.infectious);
        }
    }

    #[test]
    fn certain_hospitalization_builds_full_timer() {
        let mut params = DiseaseParams::with_name("d");
        params.chr = [1.0; 6];
        params.cic = [1.0; 6];
        params.cve = [1.0; 6];
        let disease = Disease::new(params).unwrap();
        let mut rng = agent_rng(1, RngStream::Progression, 0, 0);
        let draw = disease.check_hospitalization(AgeGroup::O65, &mut rng);
        assert!(draw.icu);
        assert!(draw.ventilator);
        // t_hosp[o65] + 2 * offset
        assert_eq!(draw.timer, 7.0 + 20.0);
    }

    #[test]
    fn impossible_hospitalization_leaves_timer_zero() {
        let mut params = DiseaseParams::with_name("d");
        params.chr = [0.0; 6];
        let disease = Disease::new(params).unwrap();
        let mut rng = agent_rng(1, RngStream::Progression, 0, 0);
        let draw = disease.check_hospitalization(AgeGroup::U5, &mut rng);
        assert_eq!(draw.timer, 0.0);
        assert!(!draw.icu && !draw.ventilator);
    }
}
