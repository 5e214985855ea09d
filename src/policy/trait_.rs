//! Policy trait for the warehouse environment.

use crate::observation::Observation;

/// Supplies one discrete action per robot per step.
///
/// Action ids follow [`crate::action::Action`]: `0 = left`, `1 = right`,
/// `2 = up`, `3 = down`, `4 = no_action`.
pub trait Policy: Send + Sync {
    /// Selects one action per robot given their observations.
    ///
    /// # Arguments
    ///
    /// * `observations` - Per-robot observations (from [`crate::observation::ObservationBuilder`])
    ///
    /// # Returns
    ///
    /// A vector of action ids, one per robot.
    fn select_actions(&mut self, observations: &[Observation]) -> Vec<usize>;

    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str;
}
