//! [`EngineConfig`]: the controlled runtime's tunables, grounded on the
//! teacher's `system::SystemConfig` builder-with-defaults pattern
//! (`spec.md` §4.3's configuration knobs: step bounds, liveness threshold,
//! deadlock/depth-bound bug reporting, coverage/trace recording).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::scheduler::{
    DfsStrategy, PortfolioStrategy, PrioritizationStrategy, ProbabilisticStrategy, RandomStrategy,
    ReinforcementLearningStrategy, SchedulingStrategy,
};
use crate::trace::{ReplayStrategy, TraceFile};

/// Which scheduling algorithm a run should use (`spec.md` §4.3).
///
/// `Portfolio` nests further kinds rather than concrete strategies so the
/// whole config stays `Clone`-able and serializable; [`build_strategy`]
/// materializes the actual `Box<dyn SchedulingStrategy>` tree.
#[derive(Debug, Clone)]
pub enum StrategyKind {
    Random,
    Probabilistic(u32),
    Prioritization(u32),
    FairPrioritization(u32),
    Portfolio(Vec<StrategyKind>),
    Dfs,
    ReinforcementLearning,
    /// Replay a previously recorded [`TraceFile`] verbatim instead of
    /// making scheduling decisions, asserting every observed operation
    /// matches what was recorded (`spec.md` §4.6).
    Replay(TraceFile),
}

impl Default for StrategyKind {
    fn default() -> Self {
        StrategyKind::Random
    }
}

/// Materialize a [`StrategyKind`] into the concrete strategy it names.
/// `Portfolio` members are seeded by offsetting `seed` with their index so
/// a single top-level seed still determines the whole run deterministically.
pub(crate) fn build_strategy(kind: &StrategyKind, seed: u64) -> Box<dyn SchedulingStrategy> {
    match kind {
        StrategyKind::Random => Box::new(RandomStrategy::new(seed)),
        StrategyKind::Probabilistic(change_count) => Box::new(ProbabilisticStrategy::new(seed, *change_count)),
        StrategyKind::Prioritization(change_points) => {
            Box::new(PrioritizationStrategy::new(seed, *change_points, false))
        }
        StrategyKind::FairPrioritization(change_points) => {
            Box::new(PrioritizationStrategy::new(seed, *change_points, true))
        }
        StrategyKind::Portfolio(kinds) => {
            let members = kinds
                .iter()
                .enumerate()
                .map(|(index, kind)| build_strategy(kind, seed.wrapping_add(index as u64)))
                .collect();
            Box::new(PortfolioStrategy::new(members))
        }
        StrategyKind::Dfs => Box::new(DfsStrategy::new()),
        StrategyKind::ReinforcementLearning => Box::new(ReinforcementLearningStrategy::new(seed)),
        StrategyKind::Replay(file) => Box::new(ReplayStrategy::new(file.clone())),
    }
}

/// Runtime configuration for one [`super::ControlledRuntime`] (`spec.md`
/// §4.3, §4.4, §4.5, §4.6's recording knobs).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub seed: u64,
    pub strategy: StrategyKind,
    pub max_fair_scheduling_steps: usize,
    pub max_unfair_scheduling_steps: usize,
    /// `ConsiderDepthBoundHitAsBug` (`spec.md` §4.3): whether hitting a
    /// step bound before the iteration completes is itself a reported bug.
    pub consider_depth_bound_hit_as_bug: bool,
    /// `LivenessTemperatureThreshold` (`spec.md` §4.3, §4.4).
    pub liveness_temperature_threshold: usize,
    /// `ReportPotentialDeadlocksAsBugs` (`spec.md` §4.3).
    pub report_potential_deadlocks_as_bugs: bool,
    pub collapse_instances: bool,
    pub merge_event_links: bool,
    pub record_coverage: bool,
    pub record_trace: bool,
}

pub const DEFAULT_MAX_FAIR_SCHEDULING_STEPS: usize = 10_000;
pub const DEFAULT_MAX_UNFAIR_SCHEDULING_STEPS: usize = 10_000;
pub const DEFAULT_LIVENESS_TEMPERATURE_THRESHOLD: usize = 100;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            strategy: StrategyKind::default(),
            max_fair_scheduling_steps: DEFAULT_MAX_FAIR_SCHEDULING_STEPS,
            max_unfair_scheduling_steps: DEFAULT_MAX_UNFAIR_SCHEDULING_STEPS,
            consider_depth_bound_hit_as_bug: false,
            liveness_temperature_threshold: DEFAULT_LIVENESS_TEMPERATURE_THRESHOLD,
            report_potential_deadlocks_as_bugs: true,
            collapse_instances: false,
            merge_event_links: false,
            record_coverage: false,
            record_trace: false,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_fair_scheduling_steps == 0 {
            return Err("max_fair_scheduling_steps must be nonzero".to_string());
        }
        if self.max_unfair_scheduling_steps == 0 {
            return Err("max_unfair_scheduling_steps must be nonzero".to_string());
        }
        if self.liveness_temperature_threshold == 0 {
            return Err("liveness_temperature_threshold must be nonzero".to_string());
        }
        if let StrategyKind::Portfolio(members) = &self.strategy {
            if members.is_empty() {
                return Err("a Portfolio strategy needs at least one member".to_string());
            }
        }
        Ok(())
    }
}

/// Fluent builder over [`EngineConfig`], mirroring the teacher's
/// `SystemConfigBuilder` (`system/config.rs`).
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn with_max_fair_scheduling_steps(mut self, steps: usize) -> Self {
        self.config.max_fair_scheduling_steps = steps;
        self
    }

    pub fn with_max_unfair_scheduling_steps(mut self, steps: usize) -> Self {
        self.config.max_unfair_scheduling_steps = steps;
        self
    }

    pub fn with_consider_depth_bound_hit_as_bug(mut self, value: bool) -> Self {
        self.config.consider_depth_bound_hit_as_bug = value;
        self
    }

    pub fn with_liveness_temperature_threshold(mut self, threshold: usize) -> Self {
        self.config.liveness_temperature_threshold = threshold;
        self
    }

    pub fn with_report_potential_deadlocks_as_bugs(mut self, value: bool) -> Self {
        self.config.report_potential_deadlocks_as_bugs = value;
        self
    }

    pub fn with_collapse_instances(mut self, value: bool) -> Self {
        self.config.collapse_instances = value;
        self
    }

    pub fn with_merge_event_links(mut self, value: bool) -> Self {
        self.config.merge_event_links = value;
        self
    }

    pub fn with_record_coverage(mut self, value: bool) -> Self {
        self.config.record_coverage = value;
        self
    }

    pub fn with_record_trace(mut self, value: bool) -> Self {
        self.config.record_trace = value;
        self
    }

    pub fn build(self) -> Result<EngineConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_step_bound_is_rejected() {
        let config = EngineConfig::builder().with_max_fair_scheduling_steps(0).build();
        assert!(config.is_err());
    }

    #[test]
    fn empty_portfolio_is_rejected() {
        let config = EngineConfig::builder()
            .with_strategy(StrategyKind::Portfolio(Vec::new()))
            .build();
        assert!(config.is_err());
    }

    #[test]
    fn builder_round_trips_fields() {
        let config = EngineConfig::builder()
            .with_seed(42)
            .with_strategy(StrategyKind::Dfs)
            .with_record_trace(true)
            .build()
            .unwrap();
        assert_eq!(config.seed, 42);
        assert!(config.record_trace);
    }

    #[test]
    fn builds_a_nested_portfolio_strategy() {
        let strategy = build_strategy(
            &StrategyKind::Portfolio(vec![StrategyKind::Random, StrategyKind::Dfs]),
            7,
        );
        assert_eq!(strategy.name(), "Portfolio");
    }
}
