pub mod dataset;
pub mod value_mapping;
