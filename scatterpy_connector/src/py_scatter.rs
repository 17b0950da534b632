use log::debug;
use numpy::ndarray::Array2;
use numpy::{Element, PyArray1, PyArray2, PyReadonlyArray1};
use pyo3::create_exception;
use pyo3::exceptions::{PyIndexError, PyRuntimeError, PyTypeError};
use pyo3::prelude::*;

use scattercore::scatter::bounds::{AxisRange, RangeBounds};
use scattercore::scatter::gather::{gather_points, gather_points_diagnosed, AxisData, GatherDiagnostics, GatheredPoints};
use scattercore::error::{GatherError, GatherResult};

create_exception!(scatterpy_connector, TypeShapeError, PyTypeError);
create_exception!(scatterpy_connector, SelectionIndexError, PyIndexError);

fn to_py_err(e: GatherError) -> PyErr {
    match &e {
        GatherError::TypeShape(_) => TypeShapeError::new_err(e.to_string()),
        GatherError::IndexOutOfRange { .. } => SelectionIndexError::new_err(e.to_string()),
        GatherError::ThreadPool(_) => PyRuntimeError::new_err(e.to_string()),
    }
}

/// Coerce any array-like to a contiguous 1-D numpy array of `dtype`.
fn coerce_1d<'py, T: Element>(
    py: Python<'py>,
    obj: &Bound<'py, PyAny>,
    dtype: &str,
    name: &str,
) -> PyResult<PyReadonlyArray1<'py, T>> {
    let numpy = py.import_bound("numpy")?;
    let arr = numpy
        .call_method1("asarray", (obj, dtype))
        .map_err(|e| TypeShapeError::new_err(format!("{name} cannot be converted to {dtype}: {e}")))?;

    let ndim: usize = arr.getattr("ndim")?.extract()?;
    if ndim != 1 {
        return Err(TypeShapeError::new_err(format!(
            "{name} must be 1-dimensional, got {ndim} dimensions"
        )));
    }

    numpy
        .call_method1("ascontiguousarray", (arr,))?
        .extract::<PyReadonlyArray1<'py, T>>()
        .map_err(|e| TypeShapeError::new_err(format!("{name}: {e}")))
}

fn coerce_optional<'py, T: Element>(
    py: Python<'py>,
    obj: Option<&Bound<'py, PyAny>>,
    dtype: &str,
    name: &str,
) -> PyResult<Option<PyReadonlyArray1<'py, T>>> {
    obj.map(|o| coerce_1d(py, o, dtype, name)).transpose()
}

fn as_optional_slice<'a, T: Element>(arr: &'a Option<PyReadonlyArray1<'_, T>>) -> PyResult<Option<&'a [T]>> {
    arr.as_ref().map(|a| a.as_slice()).transpose().map_err(Into::into)
}

/// Coerce all arguments, then run `f` on the resulting slices with the GIL released.
#[allow(clippy::too_many_arguments)]
fn with_gather_inputs<'py, R, F>(
    py: Python<'py>,
    index: &Bound<'py, PyAny>,
    index_low: Option<f64>,
    index_high: Option<f64>,
    value: &Bound<'py, PyAny>,
    value_low: Option<f64>,
    value_high: Option<f64>,
    index_mask: Option<&Bound<'py, PyAny>>,
    index_sel: Option<&Bound<'py, PyAny>>,
    index_sel_mask: Option<&Bound<'py, PyAny>>,
    value_mask: Option<&Bound<'py, PyAny>>,
    value_sel: Option<&Bound<'py, PyAny>>,
    value_sel_mask: Option<&Bound<'py, PyAny>>,
    f: F,
) -> PyResult<R>
where
    R: Send,
    F: for<'a> FnOnce(&AxisData<'a>, &AxisData<'a>, &RangeBounds) -> GatherResult<R> + Send,
{
    let index = coerce_1d::<f64>(py, index, "float64", "index")?;
    let value = coerce_1d::<f64>(py, value, "float64", "value")?;
    let index_mask = coerce_optional::<bool>(py, index_mask, "bool", "index_mask")?;
    let index_sel = coerce_optional::<i64>(py, index_sel, "int64", "index_sel")?;
    let index_sel_mask = coerce_optional::<bool>(py, index_sel_mask, "bool", "index_sel_mask")?;
    let value_mask = coerce_optional::<bool>(py, value_mask, "bool", "value_mask")?;
    let value_sel = coerce_optional::<i64>(py, value_sel, "int64", "value_sel")?;
    let value_sel_mask = coerce_optional::<bool>(py, value_sel_mask, "bool", "value_sel_mask")?;

    let index_axis = AxisData {
        values: index.as_slice()?,
        mask: as_optional_slice(&index_mask)?,
        sel: as_optional_slice(&index_sel)?,
        sel_mask: as_optional_slice(&index_sel_mask)?,
    };
    let value_axis = AxisData {
        values: value.as_slice()?,
        mask: as_optional_slice(&value_mask)?,
        sel: as_optional_slice(&value_sel)?,
        sel_mask: as_optional_slice(&value_sel_mask)?,
    };
    let bounds = RangeBounds {
        index: AxisRange::from_options(index_low, index_high),
        value: AxisRange::from_options(value_low, value_high),
    };

    debug!(
        "gathering from {} index and {} value elements",
        index_axis.values.len(),
        value_axis.values.len()
    );

    py.allow_threads(|| f(&index_axis, &value_axis, &bounds))
        .map_err(to_py_err)
}

type PointsAndSelection<'py> = (Bound<'py, PyArray2<f64>>, Option<Bound<'py, PyArray1<bool>>>);

fn to_numpy<'py>(py: Python<'py>, gathered: GatheredPoints) -> PyResult<PointsAndSelection<'py>> {
    let points = Array2::from_shape_vec((gathered.len(), 2), gathered.to_flat())
        .map_err(|e| PyRuntimeError::new_err(format!("shape error: {e}")))?;
    let selection = gathered.selection.map(|sel| PyArray1::from_vec_bound(py, sel));
    Ok((PyArray2::from_owned_array_bound(py, points), selection))
}

#[pyclass]
#[derive(Clone)]
pub struct PyGatherDiagnostics {
    pub inner: GatherDiagnostics,
}

#[pymethods]
impl PyGatherDiagnostics {
    #[getter]
    pub fn total(&self) -> usize {
        self.inner.total
    }

    #[getter]
    pub fn passed(&self) -> usize {
        self.inner.passed
    }

    #[getter]
    pub fn selected(&self) -> usize {
        self.inner.selected
    }

    #[getter]
    pub fn rejected_mask(&self) -> usize {
        self.inner.rejected_mask
    }

    #[getter]
    pub fn rejected_nan(&self) -> usize {
        self.inner.rejected_nan
    }

    #[getter]
    pub fn rejected_range(&self) -> usize {
        self.inner.rejected_range
    }

    #[getter]
    pub fn rejected(&self) -> usize {
        self.inner.rejected()
    }

    pub fn summary(&self) -> String {
        self.inner.summary()
    }

    pub fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner).map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    pub fn __repr__(&self) -> String {
        format!(
            "GatherDiagnostics(total={}, passed={}, selected={}, rejected_mask={}, rejected_nan={}, rejected_range={})",
            self.inner.total, self.inner.passed, self.inner.selected,
            self.inner.rejected_mask, self.inner.rejected_nan, self.inner.rejected_range
        )
    }
}

/// Takes index and value arrays, masks, and optional selection arrays, and
/// returns the points that pass all masking criteria together with a mask of
/// which of those points are selected.
///
/// `points` is an (N, 2) float64 array. `sel_mask` is a bool array of length
/// N, or None when no selection list or selection mask was given.
#[pyfunction]
#[pyo3(signature = (index, index_low, index_high, value, value_low, value_high, index_mask=None, index_sel=None, index_sel_mask=None, value_mask=None, value_sel=None, value_sel_mask=None))]
#[allow(clippy::too_many_arguments)]
pub fn scatterplot_gather_points<'py>(
    py: Python<'py>,
    index: &Bound<'py, PyAny>,
    index_low: Option<f64>,
    index_high: Option<f64>,
    value: &Bound<'py, PyAny>,
    value_low: Option<f64>,
    value_high: Option<f64>,
    index_mask: Option<&Bound<'py, PyAny>>,
    index_sel: Option<&Bound<'py, PyAny>>,
    index_sel_mask: Option<&Bound<'py, PyAny>>,
    value_mask: Option<&Bound<'py, PyAny>>,
    value_sel: Option<&Bound<'py, PyAny>>,
    value_sel_mask: Option<&Bound<'py, PyAny>>,
) -> PyResult<PointsAndSelection<'py>> {
    let gathered = with_gather_inputs(
        py, index, index_low, index_high, value, value_low, value_high,
        index_mask, index_sel, index_sel_mask, value_mask, value_sel, value_sel_mask,
        |index, value, bounds| gather_points(index, value, bounds),
    )?;
    to_numpy(py, gathered)
}

/// Same as `scatterplot_gather_points`, additionally returning a
/// `GatherDiagnostics` with per-criterion rejection counts.
#[pyfunction]
#[pyo3(signature = (index, index_low, index_high, value, value_low, value_high, index_mask=None, index_sel=None, index_sel_mask=None, value_mask=None, value_sel=None, value_sel_mask=None))]
#[allow(clippy::too_many_arguments)]
pub fn scatterplot_gather_points_diagnosed<'py>(
    py: Python<'py>,
    index: &Bound<'py, PyAny>,
    index_low: Option<f64>,
    index_high: Option<f64>,
    value: &Bound<'py, PyAny>,
    value_low: Option<f64>,
    value_high: Option<f64>,
    index_mask: Option<&Bound<'py, PyAny>>,
    index_sel: Option<&Bound<'py, PyAny>>,
    index_sel_mask: Option<&Bound<'py, PyAny>>,
    value_mask: Option<&Bound<'py, PyAny>>,
    value_sel: Option<&Bound<'py, PyAny>>,
    value_sel_mask: Option<&Bound<'py, PyAny>>,
) -> PyResult<(Bound<'py, PyArray2<f64>>, Option<Bound<'py, PyArray1<bool>>>, PyGatherDiagnostics)> {
    let (gathered, diagnostics) = with_gather_inputs(
        py, index, index_low, index_high, value, value_low, value_high,
        index_mask, index_sel, index_sel_mask, value_mask, value_sel, value_sel_mask,
        |index, value, bounds| gather_points_diagnosed(index, value, bounds),
    )?;
    let (points, selection) = to_numpy(py, gathered)?;
    Ok((points, selection, PyGatherDiagnostics { inner: diagnostics }))
}
