//! Swiss AbsSynthe benchmark support
//!
//! Parameterized specification families shared by the regression runner
//! and the criterion benchmarks, and the timed benchmark suite itself.

pub mod benchmarks;
pub mod families;
