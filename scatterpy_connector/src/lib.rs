mod py_scatter;

use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::py_scatter::{
    scatterplot_gather_points, scatterplot_gather_points_diagnosed, PyGatherDiagnostics,
    SelectionIndexError, TypeShapeError,
};

#[pymodule]
fn scatterpy_connector(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // RUST_LOG controls core logging; a host that already installed a logger wins.
    let _ = env_logger::try_init();

    m.add_class::<PyGatherDiagnostics>()?;
    m.add_function(wrap_pyfunction!(scatterplot_gather_points, m)?)?;
    m.add_function(wrap_pyfunction!(scatterplot_gather_points_diagnosed, m)?)?;
    m.add("TypeShapeError", m.py().get_type_bound::<TypeShapeError>())?;
    m.add("SelectionIndexError", m.py().get_type_bound::<SelectionIndexError>())?;
    Ok(())
}
