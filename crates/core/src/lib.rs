//! Postermill Core: placement and naming
//!
//! Interprets the user's editing intents and turns job settings into names:
//! - **Placement:** Drag-move, corner resize, aspect lock, manual entry,
//!   bounded undo/redo over the overlay rectangle
//! - **Snap:** Center-line alignment while moving
//! - **Naming:** Output filename generation for batch items
//!
//! This crate is pure computation. No I/O, no threads.
//! All inputs are data; all outputs are data.

pub mod naming;
pub mod placement;
pub mod snap;

pub use naming::generate_name;
pub use placement::{DragMode, PlacementSession, PlacementSettings};
