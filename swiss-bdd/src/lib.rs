//! swiss-bdd: Binary decision diagrams for symbolic game solving
//!
//! A thin layer over the complement-edge BDDs of [`oxidd`]:
//! - **Copyable handles**: a [`Bdd`] is a small index, negation is free and
//!   `f`/`!f` share one slot
//! - **Shared manager**: every operation takes `&self`, so many game views can
//!   borrow one [`Manager`] at once
//! - **Stable identity**: handed-out functions are never collected and are
//!   interned once, so equal handles mean equal functions and a handle can
//!   key long-lived caches
//!
//! # Operations
//!
//! - Connectives: [`Manager::and`], [`Manager::or`], [`Manager::xor`],
//!   [`Manager::ite`]
//! - Quantification: [`Manager::exists`], [`Manager::forall`],
//!   [`Manager::and_exists`]
//! - Cofactors and simplification: [`Manager::cofactor`],
//!   [`Manager::restrict`] (Coudert's care-set restrict, built on top)
//! - Substitution: [`Manager::vector_compose`], [`Manager::swap_variables`]
//! - Inspection: [`Manager::node_count`], [`Manager::support`],
//!   [`Manager::eval`], [`Manager::decompose`]
//!
//! # Examples
//!
//! ```rust
//! use swiss_bdd::{Bdd, Manager};
//!
//! let mgr = Manager::new(3);
//! let (x, y, z) = (mgr.var(0), mgr.var(1), mgr.var(2));
//!
//! // (x ∧ y) ∨ z, then quantify y away
//! let f = mgr.or(mgr.and(x, y), z);
//! let g = mgr.exists(f, mgr.cube([1]));
//! assert_eq!(g, mgr.or(x, z));
//!
//! // Negation never touches the manager
//! assert_eq!(!!f, f);
//! assert_eq!(mgr.and(f, !f), Bdd::FALSE);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

/// BDD handles with complement edges
pub mod bdd;

/// Errors
pub mod error;

/// Handle table and Boolean connectives
pub mod manager;

mod analysis;
mod quantify;
mod substitute;

pub use bdd::{Bdd, NodeIndex};
pub use error::{BddError, Result};
pub use manager::{Manager, ManagerStats};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
