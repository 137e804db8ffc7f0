//! Group-based interaction kernels.
//!
//! Every kernel runs the same two-pass pattern over each tile: pass 1 tallies
//! infectious candidates into a dense counter array keyed by a composite
//! group index, pass 2 multiplies each susceptible candidate's survival
//! probability by `(1 - infect * xmit * scale)^k` where `k` is the tally for
//! the agent's group. Kernels whose transmission rates depend on the
//! transmitter's age run the two passes once for adult and once for child
//! transmitters.
//!
//! The set of models is closed and dispatched through [`InteractionModel`];
//! monomorphized kernel functions live in the submodules.

mod home;
mod home_nborhood;
mod school;
mod work;
mod work_nborhood;

use crate::agents::AgentStore;
use crate::disease::Disease;

pub use home::interact_home;
pub use home_nborhood::interact_home_nborhood;
pub use school::interact_school;
pub use work::interact_work;
pub use work_nborhood::interact_work_nborhood;

/// The closed set of transmitting interaction models. Hospitals treat but do
/// not transmit, so they are not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionModel {
    Home,
    HomeNborhood,
    Work,
    WorkNborhood,
    School,
}

impl InteractionModel {
    /// Updates every susceptible candidate's survival probability for every
    /// disease. `schools_closed` selects the closed-school contact tables in
    /// the home and neighborhood models.
    pub fn interact(self, store: &mut AgentStore, diseases: &[Disease], schools_closed: bool) {
        match self {
            InteractionModel::Home => interact_home(store, diseases, schools_closed),
            InteractionModel::HomeNborhood => {
                interact_home_nborhood(store, diseases, schools_closed);
            }
            InteractionModel::Work => interact_work(store, diseases),
            InteractionModel::WorkNborhood => {
                interact_work_nborhood(store, diseases, schools_closed);
            }
            InteractionModel::School => interact_school(store, diseases),
        }
    }
}

/// One interaction term: the probability of *not* being infected by `k`
/// infectious group members transmitting at probability `xmit`.
#[inline]
pub(crate) fn survival_factor(infect: f64, xmit: f64, scale: f64, k: u32) -> f64 {
    debug_assert!((0.0..=1.0).contains(&xmit));
    let base = 1.0 - infect * xmit * scale;
    debug_assert!((0.0..=1.0).contains(&base));
    base.powi(k as i32)
}
