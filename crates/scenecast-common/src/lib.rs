pub mod errors;
pub mod events;

pub use errors::{ChannelError, ConfigError, PresenceError, ScenecastError};
pub use events::{EventBus, HostEvent};

pub type Result<T> = std::result::Result<T, ScenecastError>;
