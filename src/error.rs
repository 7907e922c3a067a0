//! Configuration errors raised while building a simulation.

/// Rejected configuration, reported by [`crate::SimulationBuilder::build`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Canvas width or height is zero, negative or not finite
    #[error("canvas must have a positive size, got {width}x{height}")]
    InvalidCanvas { width: f64, height: f64 },

    /// Frame rate is zero, negative or not finite
    #[error("frame rate must be positive, got {0}")]
    InvalidFrameRate(f64),

    /// Base launch interval is zero, negative or not finite
    #[error("seconds between launches must be positive, got {0}")]
    InvalidLaunchInterval(f64),

    /// A sampling range whose lower bound exceeds its upper bound
    #[error("{name} range is empty: min {min} > max {max}")]
    EmptyRange {
        name: &'static str,
        min: f64,
        max: f64,
    },
}

/// Result type for configuration
pub type Result<T> = std::result::Result<T, ConfigError>;
