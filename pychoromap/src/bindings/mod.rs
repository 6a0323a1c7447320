// Python bindings module

pub mod errors;
pub mod renderer;

pub use errors::to_py_err;
pub use renderer::{value_mapping_from_dict, PyGeoChoroplethRenderer};
