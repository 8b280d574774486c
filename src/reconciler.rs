//! Diff-and-apply engine keeping per-resource live mode in line with
//! visibility.
//!
//! The reconciler owns the monitored set: the resources live mode is
//! currently known to be enabled on. One `reconcile` pass re-samples
//! visibility from scratch, enables live mode on newly visible resources,
//! disables it on ones that left the screen, and purges handles that died in
//! between. It trusts nothing cached between passes.

#[cfg(test)]
mod tests;

use crate::host::{LiveModeAdapter, ResourceId, Workspace};
use crate::sampler::sample_visible;
use hashbrown::HashSet;

pub struct Reconciler<H> {
    host: H,
    monitored: HashSet<ResourceId>,
}

impl<H> Reconciler<H>
where
    H: Workspace + LiveModeAdapter,
{
    pub fn new(host: H) -> Self {
        Self {
            host,
            monitored: HashSet::new(),
        }
    }

    /// Resources live mode is currently known to be enabled on.
    pub fn monitored(&self) -> &HashSet<ResourceId> {
        &self.monitored
    }

    /// Run one reconciliation pass.
    ///
    /// A resource is in at most one of the two deltas, so the application
    /// order between enables and disables does not matter. Adapter failures
    /// are recovered per resource and never abort the pass; the next pass
    /// retries whatever is still out of line via the diff.
    pub fn reconcile(&mut self) {
        let visible = sample_visible(&self.host);

        let to_enable: Vec<ResourceId> = visible.difference(&self.monitored).copied().collect();
        let to_disable: Vec<ResourceId> = self.monitored.difference(&visible).copied().collect();

        tracing::trace!(
            visible = visible.len(),
            enable = to_enable.len(),
            disable = to_disable.len(),
            "reconciling live mode"
        );

        for resource in to_disable {
            if self.host.is_live(resource) {
                if let Err(err) = self.host.set_live_mode(resource, false) {
                    tracing::debug!(%resource, %err, "disable failed");
                }
            }
            // Removed regardless of liveness or adapter outcome: an entry
            // that is no longer visible must not stay monitored.
            self.monitored.remove(&resource);
        }

        for resource in to_enable {
            if !self.host.is_live(resource) {
                // Died between sampling and application.
                continue;
            }
            match self.host.set_live_mode(resource, true) {
                Ok(()) => {
                    self.monitored.insert(resource);
                }
                Err(err) => {
                    tracing::debug!(%resource, %err, "enable failed, retrying next pass");
                }
            }
        }

        // Purge handles that died while monitored. No adapter call here: a
        // dead resource cannot be mutated.
        let host = &self.host;
        self.monitored.retain(|resource| host.is_live(*resource));
    }

    /// Disable live mode on everything still monitored and clear the set.
    ///
    /// The set is cleared unconditionally even when a disable call fails:
    /// clean internal state wins over a guaranteed external toggle-off.
    pub fn teardown(&mut self) {
        for resource in self.monitored.drain() {
            if !self.host.is_live(resource) {
                continue;
            }
            if let Err(err) = self.host.set_live_mode(resource, false) {
                tracing::warn!(%resource, %err, "failed to disable live mode during teardown");
            }
        }
    }
}
