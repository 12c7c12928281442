//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, DocumentConverter)
//! but are themselves concrete structs, not traits.

mod export;

pub use export::{document_stem, ExportService, RenderOutput, RenderRequest};
