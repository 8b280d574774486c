//! Host collaborator contracts.
//!
//! The reconciliation engine never talks to a concrete editor or window
//! system; everything it needs from the host comes through the traits in
//! this module. `sim::SimHost` implements all of them in-process.

use crate::error::HostError;
use std::fmt;
use std::path::PathBuf;
use tokio::sync::broadcast;

/// Stable identity of a host-managed resource (e.g. an open document).
/// Valid for the lifetime of the handle; the host reports expiry through
/// [`Workspace::is_live`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

/// Identity of a displayed surface (e.g. a window split showing a resource).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A visibility-affecting event from the host. Carries no payload; any
/// variant only means "something may have changed" and triggers the same
/// debounced reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// A surface started showing a resource.
    SurfaceShown,
    /// Window layout changed (splits opened/closed, windows moved).
    LayoutChanged,
    /// The set of open resources changed.
    ResourceListChanged,
}

/// Read-only view of the host's surfaces and resource metadata.
pub trait Workspace {
    /// All surfaces currently displayed, across all windows.
    fn visible_surfaces(&self) -> Vec<SurfaceId>;

    /// The resource a surface is showing, if the surface still exists.
    fn surface_resource(&self, surface: SurfaceId) -> Option<ResourceId>;

    /// The durable storage path backing a resource. `None` means the
    /// resource is not storage-backed and is never reconciled.
    fn backing_path(&self, resource: ResourceId) -> Option<PathBuf>;

    /// Whether the host still considers the handle valid.
    fn is_live(&self, resource: ResourceId) -> bool;
}

/// Toggles the host's per-resource live-mode facility.
///
/// Calls must be idempotent: enabling an already-enabled resource (or
/// disabling an already-disabled one) is a no-op. A call on a dead resource
/// fails with [`HostError::StaleResource`]; callers treat that as
/// recoverable for the single resource involved.
pub trait LiveModeAdapter {
    fn set_live_mode(&self, resource: ResourceId, enabled: bool) -> Result<(), HostError>;
}

/// Source of visibility-change notifications.
///
/// `subscribe` returns a receiver handle; dropping it unsubscribes, which is
/// how the lifecycle guarantees no notification is delivered while inactive.
pub trait NotificationBus {
    fn subscribe(&self) -> broadcast::Receiver<HostEvent>;
}
