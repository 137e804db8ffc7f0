//! An agent-based epidemic simulator over a tiled community grid.
//!
//! Millions of individual agents, each living in an integer grid cell
//! (a *community*), move through a daily routine — home to work or school and
//! back, with occasional random and air travel — and stochastically transmit
//! one or more diseases to agents sharing a contact group. The output is a
//! per-day time series of per-community disease statistics
//! (hospitalizations, ICU use, ventilator use, deaths) and population-wide
//! status counts.
//!
//! The crate is built from three tightly coupled subsystems:
//!
//! * the agent data model: a structure-of-arrays partitioned into tiles, each
//!   owned by one worker during a kernel pass ([`agents`]);
//! * the interaction engine: five group-based kernels (household, home
//!   neighborhood, workgroup, work neighborhood, school) that multiply each
//!   susceptible agent's per-day survival probability by factors derived from
//!   the number of infectious agents sharing its groups ([`interaction`]);
//! * disease progression and the hospital state machine: per-agent timers
//!   advance infections through latent, infectious, symptomatic,
//!   hospitalized, ICU, ventilator, and recovered/dead states
//!   ([`progression`], [`hospital`]).
//!
//! [`sim::Simulation`] wires them into the daily phase sequence; [`runner`]
//! provides a command-line entry point. Reproducibility is a first-class
//! concern: with stable binning enabled, a fixed seed yields bit-identical
//! results at any thread count (see [`random`]).

pub mod agents;
pub mod config;
pub mod disease;
pub mod error;
pub mod geom;
pub mod hashing;
pub mod hospital;
pub mod infection;
pub mod interaction;
pub mod log;
pub mod numeric;
pub mod progression;
pub mod random;
pub mod report;
pub mod runner;
pub mod sim;
pub mod stats;
pub mod travel;

pub use agents::{AgentAttributes, AgentStore};
pub use config::SimConfig;
pub use disease::{Disease, DiseaseParams};
pub use error::EpigridError;
pub use geom::Domain;
pub use interaction::InteractionModel;
pub use report::{ReportConfig, ReportWriter};
pub use runner::{run, run_with_args, BaseArgs};
pub use sim::Simulation;
pub use stats::{StatsAccumulator, StatusTotals};
pub use travel::AirTravelFlow;
