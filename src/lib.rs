pub mod cli;
pub mod config;
pub mod dom;
pub mod error;
pub mod fields;
pub mod fixture;
pub mod format;
pub mod multivalued;
pub mod page;

pub use error::{PageError, PageResult};
pub use page::Page;

#[cfg(test)]
pub mod testing;
