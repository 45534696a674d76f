//! # Pheromesh Runtime
//!
//! The concurrent half of Pheromesh: edges with lock-free pheromone cells
//! and bounded ant mailboxes, one worker task per incoming edge, a single
//! task owning the random generator, and the colony that runs rounds.
//!
//! ```rust,no_run
//! use pheromesh_core::prelude::*;
//! use pheromesh_runtime::prelude::*;
//!
//! # async fn demo() -> RuntimeResult<()> {
//! let spec = square_grid(&GridOptions::new(6))?;
//! let mut colony = Colony::new(&spec, ColonyConfig::default().with_seed(7))?;
//! let summary = colony.run(100).await?;
//! println!("best path: {:?}", summary.shortest_unlooped());
//! println!("{}", export::to_dot(colony.graph()));
//! # Ok(())
//! # }
//! ```

pub mod ant;
pub mod arbiter;
pub mod barrier;
pub mod colony;
pub mod config;
pub mod edge;
pub mod error;
pub mod export;
pub mod graph;
pub mod node;
pub mod prelude;
