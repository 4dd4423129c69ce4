//! Fixed-capacity storage used by the solvers.
//!
//! Everything here is allocated once per run and then reused in place.

pub mod history;

pub use history::CurvatureHistory;
