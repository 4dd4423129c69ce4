//! Optimization building blocks shared by the solvers.

pub mod callback;
pub mod line_search;
pub mod optimizer;

pub use callback::{IterationMonitor, LoggingMonitor, NoOpMonitor, RecordingMonitor};
pub use line_search::{BacktrackingLineSearch, LineSearch, LineSearchCondition, LineSearchParams};
pub use optimizer::{OptimizationResult, TerminationReason};
