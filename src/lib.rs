//! Family-tree subtree builder.
//!
//! Given the members and relationships of one family and a root member, the
//! engine computes the root's descendant subtree: spouses are paired into
//! couples, every member gets a generation, siblings are ordered, and cyclic
//! or contradictory data still yields a finite tree. The result is emitted as
//! Graphviz DOT and optionally rendered by an external converter.
//!
//! ```
//! use famtree::domain::{build_subtree, dot, Direction, Member, Relationship, RelationshipType};
//! use uuid::Uuid;
//!
//! let (ada, william, byron) = (Uuid::from_u128(1), Uuid::from_u128(2), Uuid::from_u128(3));
//! let members = vec![
//!     Member::new(ada, "Ada", "King"),
//!     Member::new(william, "William", "King"),
//!     Member::new(byron, "Byron", "King"),
//! ];
//! let relationships = vec![
//!     Relationship::new(ada, william, RelationshipType::Wife),
//!     Relationship::new(ada, byron, RelationshipType::Child),
//! ];
//!
//! let subtree = build_subtree(&members, &relationships, ada);
//! assert_eq!(subtree.nodes.len(), 3);
//! assert_eq!(subtree.couples.len(), 1);
//!
//! let text = dot::emit(&subtree, &members, Direction::TB);
//! assert!(text.starts_with("digraph family {"));
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
