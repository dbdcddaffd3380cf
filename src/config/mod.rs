use crate::services::dispatch::DispatchMode;
use std::env;

/// Runtime configuration for the staging service
#[derive(Debug, Clone)]
pub struct StagerConfig {
    /// Port for the HTTP surface (default: 3000)
    pub port: u16,

    /// Request body limit for uploads in bytes (default: 64 MB)
    pub max_upload_size: usize,

    /// Processor handling dispatched entries: "digest" or "greet" (default: "digest")
    pub processor: String,

    /// How entries cross the processing boundary (default: by name)
    pub dispatch_mode: DispatchMode,

    /// Dispatch automatically whenever the selected entry changes (default: false)
    pub auto_dispatch: bool,
}

impl Default for StagerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            max_upload_size: 64 * 1024 * 1024, // 64 MB
            processor: "digest".to_string(),
            dispatch_mode: DispatchMode::ByName,
            auto_dispatch: false,
        }
    }
}

impl StagerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            processor: env::var("PROCESSOR").unwrap_or(default.processor),

            dispatch_mode: env::var("DISPATCH_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.dispatch_mode),

            auto_dispatch: env::var("AUTO_DISPATCH")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.auto_dispatch),
        }
    }

    /// Config for local experiments: greet processor, dispatch on every selection
    pub fn development() -> Self {
        Self {
            processor: "greet".to_string(),
            auto_dispatch: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StagerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_upload_size, 64 * 1024 * 1024);
        assert_eq!(config.processor, "digest");
        assert_eq!(config.dispatch_mode, DispatchMode::ByName);
        assert!(!config.auto_dispatch);
    }

    #[test]
    fn test_development_config() {
        let config = StagerConfig::development();
        assert_eq!(config.processor, "greet");
        assert!(config.auto_dispatch);
    }

    #[test]
    fn test_from_env_overrides() {
        unsafe {
            env::set_var("DISPATCH_MODE", "inline");
            env::set_var("AUTO_DISPATCH", "1");
        }
        let config = StagerConfig::from_env();
        unsafe {
            env::remove_var("DISPATCH_MODE");
            env::remove_var("AUTO_DISPATCH");
        }
        assert_eq!(config.dispatch_mode, DispatchMode::Inline);
        assert!(config.auto_dispatch);
    }
}
