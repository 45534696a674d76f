//! # Pheromesh Core
//!
//! Core types and pure algorithms for Pheromesh ant colony optimization.
//!
//! This crate knows nothing about tasks, channels or runtimes. It holds
//! the pieces every other crate agrees on:
//!
//! - **types** — node/ant identities, node kinds, edge snapshots, constants
//! - **topology** — a plain description of a graph, validated before use
//! - **grid** — the square grid generator used by the command line driver
//! - **trail** — the unloop algorithm that strips revisit cycles from a trail
//! - **error** — structured errors instead of panics
//!
//! ## Quick Start
//!
//! ```rust
//! use pheromesh_core::prelude::*;
//!
//! let spec = square_grid(&GridOptions::new(3)).unwrap();
//! assert_eq!(spec.nodes.len(), 9);
//!
//! assert_eq!(unloop(&[1, 2, 3, 2, 5]), vec![1, 2, 5]);
//! ```

pub mod types;
pub mod topology;
pub mod grid;
pub mod trail;
pub mod error;
pub mod prelude;
