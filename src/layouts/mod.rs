//! Layout algorithms used by the headless surface.
//!
//! Layouts operate on a slice of node positions and a list of edges given as
//! pairs of positions in that slice.

mod circular;
mod fruchterman_reingold;

pub use circular::{circular_positions, CircularSpacing};
pub use fruchterman_reingold::{FruchtermanReingold, FruchtermanReingoldState};
