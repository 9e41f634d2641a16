// Data access seam
// What a list endpoint needs from a document store

pub mod error;
pub mod find;
pub mod traits;

// Re-export commonly used items
pub use error::CollectionError;
pub use find::{FindQuery, Populate};
pub use traits::Collection;
