pub mod aggregator;
pub mod error;
pub mod executable_utils;
pub mod importer;
pub mod model;
pub mod processor;
pub mod report;
pub mod scorers;
pub mod snapshot;
pub mod storage;

pub use error::{ProcessingError, ProcessingResult};
