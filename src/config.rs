//! Pipeline configuration.

use crate::clamp::ClampConfig;
use crate::core::Timeline;
use crate::models::{ArimaEngine, ChangepointTrendConfig, ChangepointTrendEngine, LinearTrendEngine};
use crate::sanitize::SynthesisPlan;
use crate::selector::StrategyChain;
use std::fmt;

/// Model family requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ModelFamily {
    /// Changepoint trend on calendar dates.
    #[default]
    Prophet,
    /// ARIMA(1,1,1) on an equally spaced series.
    Arima,
}

impl ModelFamily {
    /// Tag reported when the primary engine wins and on pipeline-level errors.
    pub fn tag(&self) -> &'static str {
        match self {
            ModelFamily::Prophet => ChangepointTrendEngine::NAME,
            ModelFamily::Arima => ArimaEngine::NAME,
        }
    }

    pub fn fallback_tag(&self) -> &'static str {
        match self {
            ModelFamily::Prophet => "prophet_fallback",
            ModelFamily::Arima => "arima_fallback",
        }
    }

    /// Raw inputs shorter than this are replaced by a synthetic series.
    pub fn synthesis_threshold(&self) -> usize {
        match self {
            ModelFamily::Prophet => 5,
            ModelFamily::Arima => 10,
        }
    }

    /// Timeline of the synthetic series for this family.
    pub fn synthetic_timeline(&self) -> Timeline {
        match self {
            ModelFamily::Prophet => Timeline::Dated,
            ModelFamily::Arima => Timeline::Indexed,
        }
    }

    /// Primary engine (unless disabled) followed by the linear fallback.
    pub fn build_chain(&self, config: &PipelineConfig) -> StrategyChain {
        let mut chain = StrategyChain::new();
        if config.disable_primary {
            tracing::warn!(family = %self, "primary model disabled, using fallback only");
        } else {
            match self {
                ModelFamily::Prophet => {
                    chain.push(Box::new(ChangepointTrendEngine::new(config.trend.clone())))
                }
                ModelFamily::Arima => chain.push(Box::new(ArimaEngine::new())),
            }
        }
        chain.with(LinearTrendEngine::new(self.fallback_tag()))
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Settings for one pipeline invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub family: ModelFamily,
    /// Horizon used when the request omits `horizonDays`.
    pub default_horizon: usize,
    /// Largest accepted `horizonDays`.
    pub max_horizon: usize,
    /// Seed for the synthetic-series RNG.
    pub seed: Option<u64>,
    /// Skip the primary engine and go straight to the fallback.
    pub disable_primary: bool,
    pub synthetic_len: usize,
    pub clamp: ClampConfig,
    pub trend: ChangepointTrendConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            family: ModelFamily::default(),
            default_horizon: 7,
            max_horizon: 3650,
            seed: None,
            disable_primary: false,
            synthetic_len: 100,
            clamp: ClampConfig::default(),
            trend: ChangepointTrendConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new(family: ModelFamily) -> Self {
        Self {
            family,
            ..Default::default()
        }
    }

    pub fn with_family(mut self, family: ModelFamily) -> Self {
        self.family = family;
        self
    }

    pub fn with_default_horizon(mut self, horizon: usize) -> Self {
        self.default_horizon = horizon.max(1);
        self
    }

    pub fn with_max_horizon(mut self, max: usize) -> Self {
        self.max_horizon = max.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_disable_primary(mut self, disable: bool) -> Self {
        self.disable_primary = disable;
        self
    }

    pub fn with_synthetic_len(mut self, len: usize) -> Self {
        self.synthetic_len = len;
        self
    }

    pub fn with_clamp(mut self, clamp: ClampConfig) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn with_trend(mut self, trend: ChangepointTrendConfig) -> Self {
        self.trend = trend;
        self
    }

    /// Synthesis settings derived from the family and seed.
    pub fn synthesis_plan(&self) -> SynthesisPlan {
        SynthesisPlan::default()
            .with_threshold(self.family.synthesis_threshold())
            .with_length(self.synthetic_len)
            .with_timeline(self.family.synthetic_timeline())
            .with_seed(self.seed)
    }
}
