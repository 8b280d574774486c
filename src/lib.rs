pub mod config;
pub mod error;
pub mod host;
pub mod reconciler;
pub mod sampler;
pub mod service;
pub mod sim;
pub mod watch;

pub use config::LiveViewConfig;
pub use error::{ConfigError, HostError};
pub use host::{HostEvent, LiveModeAdapter, NotificationBus, ResourceId, SurfaceId, Workspace};
pub use reconciler::Reconciler;
pub use sampler::sample_visible;
pub use service::{LiveViewService, ServiceCommand, ServiceHandle};
pub use watch::{FileEvent, FileWatcher};
