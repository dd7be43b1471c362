// Storage traits and their file-backed implementations
pub mod dataset;
pub mod file;
pub mod results;

pub use dataset::*;
pub use file::*;
pub use results::*;
