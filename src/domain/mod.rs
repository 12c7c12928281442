//! Domain layer: family entities and the subtree engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod assembler;
pub mod couples;
pub mod dot;
pub mod entities;
pub mod error;
pub mod index;
pub mod walker;

pub use assembler::{build_subtree, SubTree, SubtreeAssembler};
pub use couples::{CoupleResolver, CoupleSet};
pub use entities::*;
pub use error::DomainError;
pub use index::RelationshipIndex;
pub use walker::{TreeWalker, Walk};
