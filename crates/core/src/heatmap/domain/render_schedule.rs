use crate::shared::heatmap_config::ConfigError;

/// Decides which ticks emit a composite: those whose sequence number is a
/// multiple of the render interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderSchedule {
    interval: u64,
}

impl RenderSchedule {
    pub fn new(interval: u64) -> Result<Self, ConfigError> {
        if interval < 1 {
            return Err(ConfigError::InvalidRenderInterval);
        }
        Ok(Self { interval })
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn is_due(&self, sequence: u64) -> bool {
        sequence % self.interval == 0
    }
}
