use choromap::{GeoChoroplethRenderer, MissingAttributePolicy, RenderConfig};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::path::PathBuf;

mod bindings;

use bindings::{to_py_err, value_mapping_from_dict, PyGeoChoroplethRenderer};

/// Render a vector geometry file joined with `data_dict` as an interactive HTML map
///
/// Keys of `data_dict` are matched against the `join_col_name` attribute and
/// values must be numbers. `config_path` points to an optional JSON render
/// configuration; `on_missing_attribute` (`"drop"`, `"keep-with-blank"` or
/// `"fail"`) overrides its overlay policy.
#[pyfunction]
#[pyo3(signature = (file_path, data_dict, join_col_name, value_name, output_file_name, config_path = None, on_missing_attribute = None))]
fn plot_geospatial_data(
    file_path: PathBuf,
    data_dict: &Bound<'_, PyDict>,
    join_col_name: &str,
    value_name: &str,
    output_file_name: PathBuf,
    config_path: Option<PathBuf>,
    on_missing_attribute: Option<&str>,
) -> PyResult<()> {
    let mapping = value_mapping_from_dict(data_dict)?;
    let mut config = match config_path {
        Some(path) => RenderConfig::from_json_file(&path).map_err(|e| to_py_err(e.into()))?,
        None => RenderConfig::default(),
    };
    if let Some(policy) = on_missing_attribute {
        config.overlay.on_missing_attribute = MissingAttributePolicy::parse(policy)
            .ok_or_else(|| PyValueError::new_err(format!("Unknown missing-attribute policy: {}", policy)))?;
    }
    GeoChoroplethRenderer::new(config)
        .render(
            file_path,
            mapping,
            join_col_name,
            value_name,
            output_file_name,
        )
        .map_err(to_py_err)
}

/// Python bindings for choromap
#[pymodule]
fn pychoromap(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(plot_geospatial_data, m)?)?;
    m.add_class::<PyGeoChoroplethRenderer>()?;
    m.add("__doc__", "Python bindings for choromap - choropleth map rendering")?;
    Ok(())
}
