//! Response consistency checking.

use crate::{OptimError, OptimResult};

/// Validates optimizer responses against work already performed.
///
/// A response that reorders or drops an item a robot has already picked
/// cannot be applied: the physical pick happened, the schedule did not.
/// Such violations error out of the decision cycle rather than being
/// patched up locally.
pub struct OptimizationCheck;

impl OptimizationCheck {
    /// The planned item sequence for an in-progress order must begin with
    /// the items already gathered, in the same order.
    ///
    /// `planned` is the optimizer's full item sequence for the order;
    /// `gathered` the addresses the robot has already picked.
    pub fn check_order_consistency(planned: &[String], gathered: &[String]) -> OptimResult<()> {
        if gathered.len() > planned.len() {
            return Err(OptimError::Inconsistent(format!(
                "{} items gathered but only {} planned",
                gathered.len(),
                planned.len()
            )));
        }
        for (idx, (done, plan)) in gathered.iter().zip(planned.iter()).enumerate() {
            if done != plan {
                return Err(OptimError::Inconsistent(format!(
                    "position {idx}: robot already picked {done:?} but response plans {plan:?}"
                )));
            }
        }
        Ok(())
    }

    /// A proposed next item must be open for the calling robot: not already
    /// gathered, and present in the remaining plan.
    pub fn check_next_item(
        proposed: &str,
        remaining: &[String],
        gathered: &[String],
    ) -> OptimResult<()> {
        if gathered.iter().any(|g| g == proposed) {
            return Err(OptimError::Inconsistent(format!(
                "next item {proposed:?} was already picked"
            )));
        }
        if !remaining.iter().any(|r| r == proposed) {
            return Err(OptimError::Inconsistent(format!(
                "next item {proposed:?} is not among the remaining items"
            )));
        }
        Ok(())
    }
}
