//! # Plank Puzzle Solver Library
//!
//! This library models the sliding-plank puzzle: rigid sticks lie on the edges of a
//! fixed grid graph, the player walks along the sticks connected to where they stand,
//! and may pick up one reachable stick at a time and lay it on another edge of the same
//! length that touches the reachable structure. The puzzle is solved when a stick
//! touches the end node.
//!
//! It is used by two binaries:
//! - `plank_player`: interactive play from the command line, with undo and hints.
//! - `plank_solver`: decodes a level and prints a shortest solution.
//!
//! ## Modules
//! - `geometry`: grid points, canonical edges and the crossing predicate.
//! - `engine`: the `Board` (connectivity, selection, moves, move generation),
//!   `Configuration` search states and the `Game` play session.
//! - `codec`: the base-36 level format, canonical state keys and move steps.
//! - `solver`: the breadth-first shortest-solution search.
//! - `hit_test`: maps screen coordinates back to nodes, sticks and edges.
//! - `error`: the crate's error type.

pub mod codec;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod hit_test;
pub mod solver;

pub use error::{Error, Result};
