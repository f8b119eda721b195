//! Postermill Render
//!
//! Turns a frozen placement into output files:
//!
//! ```text
//! source dir ──► list_source_images ──┐
//!                                     ▼
//! base image ──► prepare_base ──► BatchJob (frozen rect, format, naming, stamp)
//!                                     │
//!                    ┌────────────────┼────────────────┐
//!                    ▼                ▼                ▼
//!              worker: decode ► resize ► paste ► encode ► write
//!                    │                │                │
//!                    └──── BatchEvent channel (progress, failures) ──► UI
//!                                     │
//!                                     ▼
//!                            JobSummary (+ optional archive)
//! ```

pub mod archive;
pub mod batch;
pub mod compositor;
pub mod sources;

pub use archive::archive_output;
pub use batch::*;
pub use compositor::{compose, prepare_base, PreparedBase};
pub use sources::{list_source_images, preview_names, NamingPreview};
