//! Storage layer for task and plan persistence.

mod file;
mod traits;

pub(crate) use file::DATA_DIR;
pub use file::FileStorage;
pub use traits::Storage;
