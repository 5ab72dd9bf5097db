//! `From` implementations bridging `luxagg_config` types to `luxagg_core` types.

use crate::aggregation::Thresholds;
use crate::config::{SamplingCfg, SensorLimits};

impl From<&luxagg_config::AggregationCfg> for Thresholds {
    fn from(c: &luxagg_config::AggregationCfg) -> Self {
        Self {
            collapse_max: c.collapse_max_std_dev,
            passthrough_min: c.passthrough_min_std_dev,
        }
    }
}

impl From<&luxagg_config::Sampling> for SamplingCfg {
    fn from(c: &luxagg_config::Sampling) -> Self {
        Self { tick_ms: c.tick_ms }
    }
}

impl From<&luxagg_config::SensorCfg> for SensorLimits {
    fn from(c: &luxagg_config::SensorCfg) -> Self {
        Self { ceiling: c.ceiling }
    }
}
