//! Python bindings that expose the segment tree via PyO3.
use pyo3::{
    exceptions::{PyIndexError, PyValueError},
    prelude::*,
    types::PyModule,
};

use crate::{MinMaxError, MinMaxSearch, SegmentTree, TreeConfig};

/// Python-facing min/max index over a float signal.
#[pyclass]
#[derive(Debug)]
pub struct PySignalIndex {
    tree: SegmentTree<f64>,
}

#[pymethods]
impl PySignalIndex {
    #[new]
    #[pyo3(signature = (data, background = false))]
    /// Index `data`, optionally building the trees on a worker thread.
    pub fn new(data: Vec<f64>, background: bool) -> PyResult<Self> {
        let config = if background {
            TreeConfig::background()
        } else {
            TreeConfig::default()
        };
        let tree = SegmentTree::with_config(data, config).map_err(to_py_err)?;
        Ok(Self { tree })
    }

    /// Minimum and maximum of `data[l..=r]`.
    ///
    /// Args:
    ///     l: First index (inclusive).
    ///     r: Last index (inclusive).
    ///
    /// Returns:
    ///     `(low, high)` tuple.
    pub fn query_range(&self, l: usize, r: usize) -> PyResult<(f64, f64)> {
        if l > r || r >= self.tree.len() {
            return Err(PyIndexError::new_err(format!(
                "range [{l}, {r}] out of bounds for {} samples",
                self.tree.len()
            )));
        }
        Ok(self.tree.query_range(l, r))
    }

    /// Replace one sample.
    pub fn update_element(&mut self, index: usize, value: f64) -> PyResult<()> {
        self.check_index(index)?;
        self.tree.update_element(index, value);
        Ok(())
    }

    /// Replace `data[start:stop]` with `values[:stop - start]`.
    pub fn update_range(&mut self, start: usize, stop: usize, values: Vec<f64>) -> PyResult<()> {
        if start > stop || stop > self.tree.len() || values.len() < stop - start {
            return Err(PyIndexError::new_err(format!(
                "cannot write {} values to [{start}, {stop}) of {} samples",
                values.len(),
                self.tree.len()
            )));
        }
        self.tree.update_range(start, stop, &values, 0);
        Ok(())
    }

    /// Single sample.
    pub fn source_element(&self, index: usize) -> PyResult<f64> {
        self.check_index(index)?;
        Ok(self.tree.source_element(index))
    }

    /// Whether the trees are complete.
    pub fn is_ready(&self) -> bool {
        self.tree.is_ready()
    }

    /// Block until a background build finishes.
    pub fn wait_ready(&mut self) -> PyResult<()> {
        self.tree.wait_ready().map_err(to_py_err)
    }

    fn __len__(&self) -> usize {
        self.tree.len()
    }
}

impl PySignalIndex {
    fn check_index(&self, index: usize) -> PyResult<()> {
        if index >= self.tree.len() {
            return Err(PyIndexError::new_err(format!(
                "index {index} out of bounds for {} samples",
                self.tree.len()
            )));
        }
        Ok(())
    }
}

fn to_py_err(err: MinMaxError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Create Python module.
#[pymodule]
pub fn minmax_search_py(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySignalIndex>()?;
    Ok(())
}
