//! Debounce scheduler and activation lifecycle, run as one service task.
//!
//! The task owns the reconciler, the bus subscription, and the single
//! pending deadline, so reconciliation never runs concurrently with itself
//! or with event intake and the monitored set needs no locking. Operators
//! talk to the task through a [`ServiceHandle`].

use crate::config::LiveViewConfig;
use crate::host::{HostEvent, LiveModeAdapter, NotificationBus, ResourceId, Workspace};
use crate::reconciler::Reconciler;
use hashbrown::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

/// Messages sent to the service from the operator surface
#[derive(Debug)]
pub enum ServiceCommand {
    Activate,
    Deactivate,
    SetDebounce(Duration),
    Shutdown,
}

/// Handle for sending commands and reading the monitored-set snapshot.
#[derive(Clone)]
pub struct ServiceHandle {
    cmd_tx: mpsc::Sender<ServiceCommand>,
    monitored: Arc<Mutex<HashSet<ResourceId>>>,
}

impl ServiceHandle {
    pub async fn activate(&self) {
        let _ = self.cmd_tx.send(ServiceCommand::Activate).await;
    }

    pub async fn deactivate(&self) {
        let _ = self.cmd_tx.send(ServiceCommand::Deactivate).await;
    }

    pub async fn set_debounce(&self, delay: Duration) {
        let _ = self.cmd_tx.send(ServiceCommand::SetDebounce(delay)).await;
    }

    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(ServiceCommand::Shutdown).await;
    }

    /// Snapshot of the monitored set as of the last completed pass.
    pub fn monitored(&self) -> HashSet<ResourceId> {
        self.monitored
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

enum Step {
    Command(Option<ServiceCommand>),
    Notification(Result<HostEvent, broadcast::error::RecvError>),
    TimerFired,
}

pub struct LiveViewService<H, B> {
    reconciler: Reconciler<H>,
    bus: B,
    debounce: Duration,
    cmd_rx: mpsc::Receiver<ServiceCommand>,
    /// Present exactly while active; dropping it is the unsubscription.
    subscription: Option<broadcast::Receiver<HostEvent>>,
    active: bool,
    /// At most one pending reconciliation; re-armed on every notification.
    deadline: Option<Instant>,
    monitored: Arc<Mutex<HashSet<ResourceId>>>,
}

impl<H, B> LiveViewService<H, B>
where
    H: Workspace + LiveModeAdapter,
    B: NotificationBus,
{
    pub fn new(host: H, bus: B, config: &LiveViewConfig) -> (Self, ServiceHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let monitored = Arc::new(Mutex::new(HashSet::new()));

        let service = Self {
            reconciler: Reconciler::new(host),
            bus,
            debounce: config.debounce(),
            cmd_rx,
            subscription: None,
            active: false,
            deadline: None,
            monitored: Arc::clone(&monitored),
        };
        let handle = ServiceHandle { cmd_tx, monitored };
        (service, handle)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Run the service event loop until shutdown.
    pub async fn run(mut self) {
        loop {
            match self.step().await {
                Step::Command(Some(ServiceCommand::Activate)) => self.activate(),
                Step::Command(Some(ServiceCommand::Deactivate)) => self.deactivate(),
                Step::Command(Some(ServiceCommand::SetDebounce(delay))) => {
                    tracing::debug!(?delay, "debounce delay updated");
                    self.debounce = delay;
                }
                Step::Command(Some(ServiceCommand::Shutdown)) | Step::Command(None) => {
                    self.deactivate();
                    break;
                }
                Step::Notification(Ok(event)) => {
                    tracing::trace!(?event, "visibility notification");
                    self.arm_timer();
                }
                Step::Notification(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    // Dropped notifications still mean "something may have
                    // changed".
                    tracing::debug!(skipped, "notification bus lagged");
                    self.arm_timer();
                }
                Step::Notification(Err(broadcast::error::RecvError::Closed)) => {
                    tracing::debug!("notification bus closed");
                    self.subscription = None;
                }
                Step::TimerFired => {
                    // Clear the pending timer before the pass runs so the
                    // pass never observes itself as scheduled.
                    self.deadline = None;
                    self.run_pass();
                }
            }
        }
    }

    async fn step(&mut self) -> Step {
        let deadline = self.deadline;
        let armed = deadline.is_some();
        let subscription = self.subscription.as_mut();
        let subscribed = subscription.is_some();

        tokio::select! {
            cmd = self.cmd_rx.recv() => Step::Command(cmd),
            event = async move {
                match subscription {
                    Some(events) => events.recv().await,
                    // Never polled: the branch is disabled when unsubscribed.
                    None => std::future::pending().await,
                }
            }, if subscribed => Step::Notification(event),
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if armed => {
                Step::TimerFired
            }
        }
    }

    fn activate(&mut self) {
        if self.active {
            return;
        }
        tracing::info!("activating live-mode reconciliation");
        self.active = true;
        self.subscription = Some(self.bus.subscribe());
        // Establish a correct initial monitored set without waiting out the
        // quiet period.
        self.run_pass();
    }

    fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        tracing::info!("deactivating live-mode reconciliation");
        self.active = false;
        self.subscription = None;
        self.deadline = None;
        self.reconciler.teardown();
        self.publish_snapshot();
    }

    fn arm_timer(&mut self) {
        // Replaces any pending deadline: at most one timer at any instant.
        self.deadline = Some(Instant::now() + self.debounce);
    }

    fn run_pass(&mut self) {
        self.reconciler.reconcile();
        self.publish_snapshot();
    }

    fn publish_snapshot(&self) {
        let mut snapshot = self
            .monitored
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *snapshot = self.reconciler.monitored().clone();
    }
}
