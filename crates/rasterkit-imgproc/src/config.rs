use serde::{Deserialize, Serialize};

use crate::palette::PaletteConfig;
use crate::parallel::ExecutionStrategy;

/// Engine-wide tunables shared by every operation of a session.
///
/// ```
/// use rasterkit_imgproc::config::EngineConfig;
/// use rasterkit_imgproc::parallel::ExecutionStrategy;
///
/// let config: EngineConfig = serde_json::from_str(r#"{"strategy": {"kind": "serial"}}"#).unwrap();
/// assert_eq!(config.strategy, ExecutionStrategy::Serial);
/// assert_eq!(config.palette.max_colors, 8);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How per-row work is scheduled.
    pub strategy: ExecutionStrategy,
    /// Palette extraction settings.
    pub palette: PaletteConfig,
}
