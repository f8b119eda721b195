//! Postermill Model
//!
//! Defines the data contracts shared by the placement engine and the batch
//! pipeline:
//! - **Rect:** The overlay placement rectangle in base-image pixels
//! - **Transform:** Mapping between view space and image space
//! - **History:** Bounded undo/redo snapshots of the rectangle
//! - **Job:** Output format, naming and archive settings frozen per batch
//!
//! All geometry is expressed in image space (base-image pixels) unless a
//! name says otherwise.

pub mod history;
pub mod job;
pub mod rect;
pub mod transform;

pub use history::*;
pub use job::*;
pub use rect::*;
pub use transform::*;
