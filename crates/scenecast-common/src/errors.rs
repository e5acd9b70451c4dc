use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("config watch error: {0}")]
    WatchError(String),
}

/// Failures reported by a presence channel adapter.
///
/// None of these are fatal to the host: the manager turns every one of
/// them into a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("presence channel unavailable: {0}")]
    Unavailable(String),

    #[error("presence update rejected: {0}")]
    Rejected(String),

    #[error("stale channel handle {0}")]
    InvalidHandle(u64),

    #[error("presence channel closed")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PresenceError {
    #[error("a presence manager is already active")]
    DuplicateInstance,
}

/// Errors that stop the host before its event loop starts.
#[derive(Debug, thiserror::Error)]
pub enum ScenecastError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Presence(#[from] PresenceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("presence.client_id must be set".into());
        assert_eq!(
            err.to_string(),
            "config validation error: presence.client_id must be set"
        );

        let err = ConfigError::WatchError("inotify limit reached".into());
        assert_eq!(err.to_string(), "config watch error: inotify limit reached");
    }

    #[test]
    fn channel_error_display() {
        let err = ChannelError::Unavailable("no ipc socket".into());
        assert_eq!(err.to_string(), "presence channel unavailable: no ipc socket");

        let err = ChannelError::Rejected("rate limited".into());
        assert_eq!(err.to_string(), "presence update rejected: rate limited");

        assert_eq!(ChannelError::InvalidHandle(7).to_string(), "stale channel handle 7");
        assert_eq!(ChannelError::Closed.to_string(), "presence channel closed");
    }

    #[test]
    fn presence_error_display() {
        assert_eq!(
            PresenceError::DuplicateInstance.to_string(),
            "a presence manager is already active"
        );
    }

    #[test]
    fn scenecast_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: ScenecastError = config_err.into();
        assert!(matches!(err, ScenecastError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn scenecast_error_from_presence() {
        let err: ScenecastError = PresenceError::DuplicateInstance.into();
        assert!(matches!(err, ScenecastError::Presence(_)));
        assert_eq!(err.to_string(), "a presence manager is already active");
    }
}
