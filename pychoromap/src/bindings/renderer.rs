use choromap::{GeoChoroplethRenderer, PreconditionError, RenderConfig, ValueMapping};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::path::PathBuf;

use crate::bindings::errors::to_py_err;

/// Read a `{key: number}` dict; keys are converted with `str()`
pub fn value_mapping_from_dict(data_dict: &Bound<'_, PyDict>) -> PyResult<ValueMapping> {
    let mut entries: Vec<(String, f64)> = Vec::with_capacity(data_dict.len());
    for (key, value) in data_dict.iter() {
        let key = key.str()?.to_string();
        let number = match value.extract::<f64>() {
            Ok(number) => number,
            Err(_) => {
                let found = value.repr()?.to_string();
                return Err(to_py_err(
                    PreconditionError::NonNumericValue { key, found }.into(),
                ));
            }
        };
        entries.push((key, number));
    }
    ValueMapping::new(entries).map_err(|e| to_py_err(e.into()))
}

/// GeoChoroplethRenderer Python binding
#[pyclass(name = "GeoChoroplethRenderer")]
pub struct PyGeoChoroplethRenderer {
    inner: GeoChoroplethRenderer,
}

#[pymethods]
impl PyGeoChoroplethRenderer {
    /// Create a renderer, optionally from a JSON render configuration
    #[new]
    #[pyo3(signature = (config_path = None))]
    fn new(config_path: Option<PathBuf>) -> PyResult<Self> {
        let config = match config_path {
            Some(path) => RenderConfig::from_json_file(&path).map_err(|e| to_py_err(e.into()))?,
            None => RenderConfig::default(),
        };
        Ok(PyGeoChoroplethRenderer {
            inner: GeoChoroplethRenderer::new(config),
        })
    }

    /// Render `file_path` shaded by `data_dict` into `output_file_name`
    #[pyo3(signature = (file_path, data_dict, join_col_name, value_name, output_file_name))]
    fn render(
        &self,
        file_path: PathBuf,
        data_dict: &Bound<'_, PyDict>,
        join_col_name: &str,
        value_name: &str,
        output_file_name: PathBuf,
    ) -> PyResult<()> {
        let mapping = value_mapping_from_dict(data_dict)?;
        self.inner
            .render(
                file_path,
                mapping,
                join_col_name,
                value_name,
                output_file_name,
            )
            .map_err(to_py_err)
    }

    /// Fill colour scheme in use
    #[getter]
    fn fill_color(&self) -> String {
        self.inner.config().choropleth.fill_color.clone()
    }

    /// Number of colour bins
    #[getter]
    fn bins(&self) -> usize {
        self.inner.config().choropleth.bins
    }
}
