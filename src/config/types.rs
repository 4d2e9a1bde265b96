use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dispatcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Reject argument vectors longer than this; 0 disables the limit (default: 32).
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Print the accepted arguments when an unknown one is given (default: true).
    #[serde(default = "default_list_accepted")]
    pub list_accepted_on_unknown: bool,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset (default: "warn").
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_max_tokens() -> usize {
    32
}

fn default_list_accepted() -> bool {
    true
}

fn default_filter() -> String {
    "warn".to_string()
}

impl DispatchConfig {
    /// Token limit to hand to the dispatcher.
    pub fn token_limit(&self) -> Option<usize> {
        (self.max_tokens > 0).then_some(self.max_tokens)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            list_accepted_on_unknown: default_list_accepted(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}
