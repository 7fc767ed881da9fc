// Field lifecycle manager: descriptors are mounted on marker-carrying
// elements as they enter the observed tree and cleaned up as they leave it

pub mod behaviors;
pub mod context;
pub mod descriptor;
pub mod registry;
pub mod tracker;
pub mod watcher;

// Re-export core types
pub use context::*;
pub use descriptor::*;
pub use registry::*;
pub use tracker::*;
pub use watcher::*;
