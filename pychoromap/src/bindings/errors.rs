use choromap::{PreconditionError, RenderError};
use pyo3::exceptions::{PyAssertionError, PyFileNotFoundError, PyRuntimeError, PyValueError};
use pyo3::PyErr;

/// Map a render error to the Python exception callers expect
///
/// Input checks raise `AssertionError`, except a missing input file which
/// raises `FileNotFoundError`. Data problems found while joining raise
/// `ValueError`; everything from the geometry and IO stack `RuntimeError`.
pub fn to_py_err(err: RenderError) -> PyErr {
    match err {
        RenderError::Precondition(PreconditionError::InputNotFound(path)) => {
            PyFileNotFoundError::new_err(format!("Input file not found: {}", path.display()))
        }
        RenderError::Precondition(e) => PyAssertionError::new_err(e.to_string()),
        RenderError::Library(e) => PyRuntimeError::new_err(format!("{:#}", e)),
        other => PyValueError::new_err(other.to_string()),
    }
}
