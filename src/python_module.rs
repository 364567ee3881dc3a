//! Python bindings for ferric-cuckoo using PyO3

use crate::{CuckooError, CuckooFilter, FilterConfig, TableKind, XxHash64};
use numpy::{IntoPyArray, PyArray1};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

fn to_py_err(err: CuckooError) -> PyErr {
    match err {
        CuckooError::InvalidParameter(_) => PyValueError::new_err(err.to_string()),
        CuckooError::Full | CuckooError::AltIndexAsymmetry { .. } => {
            PyRuntimeError::new_err(err.to_string())
        }
    }
}

/// Python wrapper for CuckooFilter
#[pyclass(name = "CuckooFilter")]
struct PyCuckooFilter {
    inner: CuckooFilter,
}

#[pymethods]
impl PyCuckooFilter {
    #[new]
    #[pyo3(signature = (num_keys=10000, bits_per_item=16, tags_per_bucket=4, max_kicks=500, table="fixed", hash_seed=0, seed=None))]
    fn new(
        num_keys: u32,
        bits_per_item: u32,
        tags_per_bucket: u32,
        max_kicks: usize,
        table: &str,
        hash_seed: u64,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let table = match table {
            "fixed" => TableKind::FixedWidth,
            "semi_sorted" => TableKind::SemiSorted,
            other => {
                return Err(PyValueError::new_err(format!(
                    "Unknown table kind: {} (expected 'fixed' or 'semi_sorted')",
                    other
                )))
            }
        };

        let mut config = FilterConfig::default()
            .with_num_keys(num_keys)
            .with_bits_per_item(bits_per_item)
            .with_tags_per_bucket(tags_per_bucket)
            .with_max_kicks(max_kicks)
            .with_table(table)
            .with_hash(XxHash64::with_seed(hash_seed));
        config.seed = seed;

        let filter = CuckooFilter::new(config).map_err(to_py_err)?;
        Ok(PyCuckooFilter { inner: filter })
    }

    fn insert(&mut self, item: &[u8]) -> PyResult<()> {
        self.inner.insert(item).map_err(to_py_err)
    }

    fn contains(&self, item: &[u8]) -> PyResult<bool> {
        self.inner.contains(item).map_err(to_py_err)
    }

    fn delete(&mut self, item: &[u8]) -> bool {
        self.inner.delete(item)
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    fn load_factor(&self) -> f64 {
        self.inner.load_factor()
    }

    fn bits_per_item(&self) -> f64 {
        self.inner.bits_per_item()
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn bucket_loads<'py>(&self, py: Python<'py>) -> &'py PyArray1<usize> {
        self.inner.bucket_loads().into_pyarray(py)
    }

    fn table_info(&self) -> String {
        self.inner.table_info()
    }

    fn stats(&self) -> String {
        self.inner.stats().to_string()
    }

    fn __contains__(&self, item: &[u8]) -> PyResult<bool> {
        self.contains(item)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __str__(&self) -> String {
        format!(
            "CuckooFilter(elements={}, load_factor={:.6}, full={})",
            self.inner.len(),
            self.inner.load_factor(),
            self.inner.is_full()
        )
    }

    fn __repr__(&self) -> String {
        format!("CuckooFilter(len={})", self.inner.len())
    }
}

/// Python module definition
#[pymodule]
fn ferric_cuckoo(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyCuckooFilter>()?;

    m.add("DEFAULT_MAX_KICKS", crate::config::DEFAULT_MAX_KICKS)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
