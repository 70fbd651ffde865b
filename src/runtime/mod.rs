//! The controlled runtime: the single-threaded scheduling loop that drives
//! every actor and monitor for one test iteration (`spec.md` §4.3, §5, §6).
//!
//! - [`config`] — [`EngineConfig`]/[`EngineConfigBuilder`]/[`StrategyKind`], the tunables.
//! - [`error`] — [`EngineError`], the failure surface.
//! - [`engine`] — [`ControlledRuntime`], the driver itself.

pub mod config;
pub mod engine;
pub mod error;

pub use config::{EngineConfig, EngineConfigBuilder, StrategyKind};
pub use engine::ControlledRuntime;
pub use error::EngineError;
