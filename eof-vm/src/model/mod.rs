//! Public model surface: type metadata, stack words, and the decoded container.

pub mod container;
pub mod types;

pub use container::{Container, ContainerBuilder};
pub use types::{CodeMeta, Word, MAX_IO, MAX_STACK_HEIGHT};
