pub mod dataset;
pub mod error;
pub mod model;
pub mod types;
