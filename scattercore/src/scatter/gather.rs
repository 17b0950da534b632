//! Point gathering for scatterplots.
//!
//! Turns two parallel coordinate arrays, their optional masks and selections,
//! and a set of range bounds into a compact list of plottable points plus a
//! parallel "selected" flag per point.

use itertools::{Either, Itertools};
use log::{debug, trace};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{Axis, GatherError, GatherResult};
use crate::scatter::bounds::RangeBounds;
use crate::scatter::selection::expand_selection_indices;
use crate::scatter::vec_utils::{filter_with_inverted_mask, filter_with_mask, has_length};

/// One coordinate array together with its optional mask and selections.
///
/// Masks and selection masks must have the same length as `values`. A
/// selection can be given as a list of positions, as a mask, or both.
#[derive(Clone, Copy, Debug, Default)]
pub struct AxisData<'a> {
    /// Coordinates along this axis.
    pub values: &'a [f64],
    /// `false` excludes the element.
    pub mask: Option<&'a [bool]>,
    /// Positions of selected elements.
    pub sel: Option<&'a [i64]>,
    /// `true` marks the element as selected.
    pub sel_mask: Option<&'a [bool]>,
}

impl<'a> AxisData<'a> {
    pub fn new(values: &'a [f64]) -> Self {
        AxisData { values, mask: None, sel: None, sel_mask: None }
    }

    pub fn with_mask(mut self, mask: &'a [bool]) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_selection(mut self, sel: &'a [i64]) -> Self {
        self.sel = Some(sel);
        self
    }

    pub fn with_selection_mask(mut self, sel_mask: &'a [bool]) -> Self {
        self.sel_mask = Some(sel_mask);
        self
    }

    /// Whether any selection criterion was supplied, even an empty one.
    pub fn has_selection(&self) -> bool {
        self.sel.is_some() || self.sel_mask.is_some()
    }

    fn validate(&self, axis: Axis) -> GatherResult<()> {
        let len = self.values.len();
        if !has_length(self.mask, len) {
            return Err(GatherError::TypeShape(format!(
                "{axis}_mask has length {}, expected {len}",
                self.mask.map_or(0, <[bool]>::len)
            )));
        }
        if !has_length(self.sel_mask, len) {
            return Err(GatherError::TypeShape(format!(
                "{axis}_sel_mask has length {}, expected {len}",
                self.sel_mask.map_or(0, <[bool]>::len)
            )));
        }
        Ok(())
    }
}

/// Points that survived gathering, in input order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GatheredPoints {
    /// Surviving `[x, y]` pairs.
    pub points: Vec<[f64; 2]>,
    /// Per-point selected flag, `None` when no selection criterion was given.
    pub selection: Option<Vec<bool>>,
}

impl GatheredPoints {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.selection
            .as_ref()
            .map_or(0, |sel| sel.iter().filter(|&&s| s).count())
    }

    /// Row-major `N x 2` buffer.
    pub fn to_flat(&self) -> Vec<f64> {
        self.points.iter().flatten().copied().collect()
    }

    pub fn selected_points(&self) -> Vec<[f64; 2]> {
        match &self.selection {
            Some(sel) => filter_with_mask(&self.points, sel),
            None => Vec::new(),
        }
    }

    pub fn unselected_points(&self) -> Vec<[f64; 2]> {
        match &self.selection {
            Some(sel) => filter_with_inverted_mask(&self.points, sel),
            None => self.points.clone(),
        }
    }

    /// Split into `(selected, unselected)` in a single pass.
    pub fn split_by_selection(&self) -> (Vec<[f64; 2]>, Vec<[f64; 2]>) {
        match &self.selection {
            Some(sel) => self
                .points
                .iter()
                .zip(sel.iter())
                .partition_map(|(&p, &s)| if s { Either::Left(p) } else { Either::Right(p) }),
            None => (Vec::new(), self.points.clone()),
        }
    }
}

/// Counts of why elements were dropped during a gather.
///
/// Each of the first `total` elements lands in exactly one of
/// `rejected_mask`, `rejected_nan`, `rejected_range` or `passed`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatherDiagnostics {
    pub total: usize,
    pub passed: usize,
    pub selected: usize,

    pub rejected_mask: usize,
    pub rejected_nan: usize,
    pub rejected_range: usize,
}

impl GatherDiagnostics {
    pub fn rejected(&self) -> usize {
        self.rejected_mask + self.rejected_nan + self.rejected_range
    }

    pub fn summary(&self) -> String {
        let pct = if self.total > 0 {
            (self.passed as f64 / self.total as f64) * 100.0
        } else {
            100.0
        };

        format!(
            "GatherDiagnostics: {}/{} passed ({:.1}%), {} selected, {} rejected\n\
             Rejections by criterion:\n\
             - mask: {}\n\
             - nan: {}\n\
             - range: {}",
            self.passed,
            self.total,
            pct,
            self.selected,
            self.rejected(),
            self.rejected_mask,
            self.rejected_nan,
            self.rejected_range,
        )
    }
}

/// Configuration for choosing between the sequential and parallel pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatherConfig {
    /// Minimum number of elements before the parallel pass is used (default: 262144)
    pub parallel_threshold: usize,
    /// Threads for a dedicated pool, 0 uses rayon's global pool (default: 0)
    pub num_threads: usize,
}

impl Default for GatherConfig {
    fn default() -> Self {
        GatherConfig {
            parallel_threshold: 1 << 18,
            num_threads: 0,
        }
    }
}

impl GatherConfig {
    /// Never go parallel.
    pub fn sequential() -> Self {
        GatherConfig {
            parallel_threshold: usize::MAX,
            num_threads: 0,
        }
    }

    /// Always go parallel, on a dedicated pool if `num_threads > 0`.
    pub fn parallel(num_threads: usize) -> Self {
        GatherConfig {
            parallel_threshold: 0,
            num_threads,
        }
    }
}

enum Verdict {
    Masked,
    Nan,
    OutOfRange,
    Keep(bool),
}

/// Validated inputs with selection lists expanded to lookup tables.
struct PreparedGather<'a> {
    x: &'a [f64],
    y: &'a [f64],
    x_mask: Option<&'a [bool]>,
    y_mask: Option<&'a [bool]>,
    x_sel: Option<Vec<bool>>,
    y_sel: Option<Vec<bool>>,
    x_sel_mask: Option<&'a [bool]>,
    y_sel_mask: Option<&'a [bool]>,
    bounds: RangeBounds,
    track_selection: bool,
    n: usize,
}

impl<'a> PreparedGather<'a> {
    fn new(index: &AxisData<'a>, value: &AxisData<'a>, bounds: &RangeBounds) -> GatherResult<Self> {
        index.validate(Axis::Index)?;
        value.validate(Axis::Value)?;

        let x_sel = expand_selection_indices(index.sel, index.values.len(), Axis::Index)?;
        let y_sel = expand_selection_indices(value.sel, value.values.len(), Axis::Value)?;

        Ok(PreparedGather {
            x: index.values,
            y: value.values,
            x_mask: index.mask,
            y_mask: value.mask,
            x_sel,
            y_sel,
            x_sel_mask: index.sel_mask,
            y_sel_mask: value.sel_mask,
            bounds: *bounds,
            track_selection: index.has_selection() || value.has_selection(),
            n: index.values.len().min(value.values.len()),
        })
    }

    #[inline]
    fn classify(&self, i: usize) -> Verdict {
        if self.x_mask.map_or(false, |m| !m[i]) || self.y_mask.map_or(false, |m| !m[i]) {
            return Verdict::Masked;
        }

        let x = self.x[i];
        let y = self.y[i];
        if x.is_nan() || y.is_nan() {
            return Verdict::Nan;
        }

        if !self.bounds.contains(x, y) {
            return Verdict::OutOfRange;
        }

        Verdict::Keep(self.track_selection && self.is_selected(i))
    }

    #[inline]
    fn is_selected(&self, i: usize) -> bool {
        self.x_sel.as_ref().map_or(false, |s| s[i])
            || self.y_sel.as_ref().map_or(false, |s| s[i])
            || self.x_sel_mask.map_or(false, |s| s[i])
            || self.y_sel_mask.map_or(false, |s| s[i])
    }

    fn gather(&self) -> (GatheredPoints, GatherDiagnostics) {
        let mut points: Vec<[f64; 2]> = Vec::with_capacity(self.n);
        let mut selection: Option<Vec<bool>> = self.track_selection.then(|| Vec::with_capacity(self.n));
        let mut diagnostics = GatherDiagnostics { total: self.n, ..Default::default() };

        for i in 0..self.n {
            match self.classify(i) {
                Verdict::Masked => diagnostics.rejected_mask += 1,
                Verdict::Nan => diagnostics.rejected_nan += 1,
                Verdict::OutOfRange => diagnostics.rejected_range += 1,
                Verdict::Keep(selected) => {
                    points.push([self.x[i], self.y[i]]);
                    if let Some(sel) = selection.as_mut() {
                        sel.push(selected);
                    }
                    diagnostics.passed += 1;
                    if selected {
                        diagnostics.selected += 1;
                    }
                }
            }
        }

        points.shrink_to_fit();
        if let Some(sel) = selection.as_mut() {
            sel.shrink_to_fit();
        }

        (GatheredPoints { points, selection }, diagnostics)
    }

    fn gather_par(&self) -> GatheredPoints {
        let kept = (0..self.n)
            .into_par_iter()
            .filter_map(|i| match self.classify(i) {
                Verdict::Keep(selected) => Some(([self.x[i], self.y[i]], selected)),
                _ => None,
            });

        if !self.track_selection {
            return GatheredPoints {
                points: kept.map(|(point, _)| point).collect(),
                selection: None,
            };
        }

        let (points, selection): (Vec<[f64; 2]>, Vec<bool>) = kept.unzip();
        GatheredPoints { points, selection: Some(selection) }
    }
}

/// Gather the plottable points of a scatterplot.
///
/// An element `i < min(len(index), len(value))` survives when neither mask
/// excludes it, neither coordinate is NaN, and both coordinates lie inside
/// their inclusive bounds. Survivors keep their input order.
///
/// A survivor is selected when any of the index/value selection lists or
/// selection masks marks position `i`. If no selection criterion is given at
/// all, the returned selection is `None`.
///
/// # Arguments
///
/// * `index` - x coordinates with optional mask and selections
/// * `value` - y coordinates with optional mask and selections
/// * `bounds` - inclusive acceptance ranges for both axes
///
/// # Returns
///
/// * `GatheredPoints` - the compacted points and their selection flags
///
/// # Example
///
/// ```
/// use scattercore::scatter::bounds::RangeBounds;
/// use scattercore::scatter::gather::{gather_points, AxisData};
///
/// let x = [0.0, 1.0, 2.0, 3.0];
/// let y = [0.0, 1.0, 2.0, 3.0];
/// let sel_mask = [false, false, false, true];
///
/// let gathered = gather_points(
///     &AxisData::new(&x).with_selection(&[1]),
///     &AxisData::new(&y).with_selection_mask(&sel_mask),
///     &RangeBounds::new(0.0, 3.0, 0.0, 3.0),
/// ).unwrap();
///
/// assert_eq!(gathered.points, vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]);
/// assert_eq!(gathered.selection, Some(vec![false, true, false, true]));
/// ```
pub fn gather_points(
    index: &AxisData,
    value: &AxisData,
    bounds: &RangeBounds,
) -> GatherResult<GatheredPoints> {
    let (gathered, diagnostics) = gather_points_diagnosed(index, value, bounds)?;
    debug!("{}", diagnostics.summary());
    Ok(gathered)
}

/// Like [`gather_points`], also reporting why elements were rejected.
pub fn gather_points_diagnosed(
    index: &AxisData,
    value: &AxisData,
    bounds: &RangeBounds,
) -> GatherResult<(GatheredPoints, GatherDiagnostics)> {
    let prepared = PreparedGather::new(index, value, bounds)?;
    Ok(prepared.gather())
}

/// Parallel [`gather_points`] on rayon's current pool, same output.
pub fn gather_points_par(
    index: &AxisData,
    value: &AxisData,
    bounds: &RangeBounds,
) -> GatherResult<GatheredPoints> {
    let prepared = PreparedGather::new(index, value, bounds)?;
    Ok(prepared.gather_par())
}

/// Gather sequentially or in parallel depending on the input size.
pub fn gather_points_with_config(
    index: &AxisData,
    value: &AxisData,
    bounds: &RangeBounds,
    config: &GatherConfig,
) -> GatherResult<GatheredPoints> {
    let prepared = PreparedGather::new(index, value, bounds)?;

    if prepared.n < config.parallel_threshold {
        let (gathered, diagnostics) = prepared.gather();
        debug!("{}", diagnostics.summary());
        return Ok(gathered);
    }

    if config.num_threads == 0 {
        trace!("gathering {} elements on the global pool", prepared.n);
        return Ok(prepared.gather_par());
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build()?;

    trace!("gathering {} elements on {} threads", prepared.n, config.num_threads);
    Ok(pool.install(|| prepared.gather_par()))
}
