//! Scriptable in-process host, used by the REPL binary and the test suite.
//!
//! `SimHost` is a cloneable handle over shared state; the service task and
//! the operator side hold clones of the same host, mirroring how a real
//! embedding would share its editor context.

use crate::error::HostError;
use crate::host::{HostEvent, LiveModeAdapter, NotificationBus, ResourceId, SurfaceId, Workspace};
use hashbrown::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

#[derive(Debug)]
struct SimResource {
    backing_path: Option<PathBuf>,
    alive: bool,
}

#[derive(Debug, Default)]
struct SimState {
    resources: HashMap<ResourceId, SimResource>,
    surfaces: HashMap<SurfaceId, ResourceId>,
    live_mode: HashSet<ResourceId>,
    fail_once: HashSet<ResourceId>,
    next_resource: u64,
    next_surface: u64,
    enable_calls: u64,
    disable_calls: u64,
    sample_calls: u64,
}

/// Cloneable handle to the simulated host. Implements all host traits so one
/// instance serves as workspace, adapter, and notification bus at once.
#[derive(Clone)]
pub struct SimHost {
    state: Arc<Mutex<SimState>>,
    events: broadcast::Sender<HostEvent>,
}

impl SimHost {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            state: Arc::new(Mutex::new(SimState::default())),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: HostEvent) {
        // No receiver while the service is inactive; that is fine.
        let _ = self.events.send(event);
    }

    /// Open a resource, optionally backed by a storage path.
    pub fn open(&self, backing_path: Option<PathBuf>) -> ResourceId {
        let id = {
            let mut state = self.lock();
            state.next_resource += 1;
            let id = ResourceId(state.next_resource);
            state.resources.insert(
                id,
                SimResource {
                    backing_path,
                    alive: true,
                },
            );
            id
        };
        self.emit(HostEvent::ResourceListChanged);
        id
    }

    /// Display a resource on a fresh surface.
    pub fn show(&self, resource: ResourceId) -> SurfaceId {
        let surface = {
            let mut state = self.lock();
            state.next_surface += 1;
            let surface = SurfaceId(state.next_surface);
            state.surfaces.insert(surface, resource);
            surface
        };
        self.emit(HostEvent::SurfaceShown);
        surface
    }

    /// Remove a surface from display. Returns false if it did not exist.
    pub fn hide(&self, surface: SurfaceId) -> bool {
        let removed = self.lock().surfaces.remove(&surface).is_some();
        if removed {
            self.emit(HostEvent::LayoutChanged);
        }
        removed
    }

    /// Close a resource: its surfaces disappear and the handle goes dead.
    pub fn close(&self, resource: ResourceId) -> bool {
        let closed = {
            let mut state = self.lock();
            state.surfaces.retain(|_, shown| *shown != resource);
            match state.resources.get_mut(&resource) {
                Some(entry) if entry.alive => {
                    entry.alive = false;
                    true
                }
                _ => false,
            }
        };
        if closed {
            self.emit(HostEvent::ResourceListChanged);
        }
        closed
    }

    /// Invalidate a handle while leaving its surfaces in place, as when the
    /// host drops a resource out from under a still-displayed surface.
    pub fn kill(&self, resource: ResourceId) -> bool {
        let killed = match self.lock().resources.get_mut(&resource) {
            Some(entry) if entry.alive => {
                entry.alive = false;
                true
            }
            _ => false,
        };
        if killed {
            self.emit(HostEvent::ResourceListChanged);
        }
        killed
    }

    /// Emit a layout-change notification without touching any state.
    pub fn layout_changed(&self) {
        self.emit(HostEvent::LayoutChanged);
    }

    /// Make the next `set_live_mode` call on this resource fail.
    pub fn fail_next_toggle(&self, resource: ResourceId) {
        self.lock().fail_once.insert(resource);
    }

    pub fn live_mode_enabled(&self, resource: ResourceId) -> bool {
        self.lock().live_mode.contains(&resource)
    }

    /// Resources the adapter currently has live mode enabled on.
    pub fn enabled_set(&self) -> HashSet<ResourceId> {
        self.lock().live_mode.clone()
    }

    /// (enable, disable) adapter call counts, failed attempts included.
    pub fn toggle_counts(&self) -> (u64, u64) {
        let state = self.lock();
        (state.enable_calls, state.disable_calls)
    }

    /// Number of times the workspace has been sampled.
    pub fn sample_calls(&self) -> u64 {
        self.lock().sample_calls
    }
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace for SimHost {
    fn visible_surfaces(&self) -> Vec<SurfaceId> {
        let mut state = self.lock();
        state.sample_calls += 1;
        state.surfaces.keys().copied().collect()
    }

    fn surface_resource(&self, surface: SurfaceId) -> Option<ResourceId> {
        self.lock().surfaces.get(&surface).copied()
    }

    fn backing_path(&self, resource: ResourceId) -> Option<PathBuf> {
        self.lock()
            .resources
            .get(&resource)
            .and_then(|entry| entry.backing_path.clone())
    }

    fn is_live(&self, resource: ResourceId) -> bool {
        self.lock()
            .resources
            .get(&resource)
            .is_some_and(|entry| entry.alive)
    }
}

impl LiveModeAdapter for SimHost {
    fn set_live_mode(&self, resource: ResourceId, enabled: bool) -> Result<(), HostError> {
        let mut state = self.lock();
        if enabled {
            state.enable_calls += 1;
        } else {
            state.disable_calls += 1;
        }

        if state.fail_once.remove(&resource) {
            return Err(HostError::StaleResource(resource));
        }
        let alive = state
            .resources
            .get(&resource)
            .is_some_and(|entry| entry.alive);
        if !alive {
            return Err(HostError::StaleResource(resource));
        }

        if enabled {
            state.live_mode.insert(resource);
        } else {
            state.live_mode.remove(&resource);
        }
        Ok(())
    }
}

impl NotificationBus for SimHost {
    fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.events.subscribe()
    }
}
