pub mod expression_based_scorer;
pub mod pipeline;

pub use pipeline::build_processor;
