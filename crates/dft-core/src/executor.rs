use crate::plan::{CanisterOption, CanisterReinstallOptions, PlanFlags};
use std::fmt;

/// A failed reinstall, tagged with the canister it happened on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionError {
    pub canister: String,
    pub reason: String,
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Reinstall of '{}' failed: {}", self.canister, self.reason)
    }
}

impl std::error::Error for ExecutionError {}

/// Performs the actual build/install calls for a plan.
///
/// Implementations own all I/O. `run_batch` receives every canister that
/// may proceed together; the default runs them in order, an executor that
/// can issue calls concurrently overrides it.
pub trait ReinstallExecutor {
    /// Rebuild (when `flags.build`) and reinstall one canister, passing
    /// `option.init_options` as constructor arguments when present.
    fn reinstall(
        &mut self,
        canister: &str,
        option: &CanisterOption,
        flags: PlanFlags,
    ) -> Result<(), String>;

    fn run_batch(
        &mut self,
        batch: &[(&str, &CanisterOption)],
        flags: PlanFlags,
    ) -> Result<(), ExecutionError> {
        for (canister, option) in batch {
            self.reinstall(canister, option, flags)
                .map_err(|reason| ExecutionError {
                    canister: canister.to_string(),
                    reason,
                })?;
        }
        Ok(())
    }
}

/// Walk the plan batch by batch, stopping at the first failure.
/// Returns the keys reinstalled, in execution order.
pub fn execute_plan<E: ReinstallExecutor + ?Sized>(
    plan: &CanisterReinstallOptions,
    executor: &mut E,
) -> Result<Vec<String>, ExecutionError> {
    let flags = plan.flags();
    let mut done = Vec::new();

    for (index, batch) in plan.batches().iter().enumerate() {
        log::debug!(
            "reinstall batch {}: {:?}",
            index,
            batch.iter().map(|(k, _)| *k).collect::<Vec<_>>()
        );
        executor.run_batch(batch, flags)?;
        done.extend(batch.iter().map(|(k, _)| k.to_string()));
    }

    log::info!("reinstalled {} canisters", done.len());
    Ok(done)
}

// ─────────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────────
