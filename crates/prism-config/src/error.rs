use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source failed to parse, or a value has the wrong type.
    #[error("invalid configuration: {0}")]
    Figment(#[from] figment::Error),

    /// A job needs a section that has none of its required fields set.
    #[error("[{section}] is not configured; see `prism config` for the effective values")]
    NotConfigured { section: String },
}
