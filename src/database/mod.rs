//! [`crate::Collection`] backends.
//!
//! - [`MemoryCollection`]: documents held in process, with relation expansion
//! - [`SeaCollection`]: a SQL table reached through a sea-orm connection

pub mod memory;
pub mod sea;

pub use memory::{MemoryCollection, Relation};
pub use sea::{ColumnKind, IdKind, SeaCollection};
