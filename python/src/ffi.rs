//! ffi.rs
//! `Compressor` and `Deflater` classes plus the format constants.
//!
//! Summary: Each call releases the interpreter lock before the instance
//! lock is taken inside core, so no thread ever waits on an instance lock
//! while holding the interpreter lock.

use pyo3::buffer::PyBuffer;
use pyo3::exceptions::{PyIOError, PyMemoryError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;
use tracing::debug;

use deflate_stream_core::compression::constants::{
    format_ids, DEFAULT_BLOCK_SPLITTING_MAX, DEFAULT_ITERATIONS,
};
use deflate_stream_core::compression::{BufferingCompressor, IncrementalEncoder};
use deflate_stream_core::types::CompressError;

fn to_py_err(e: CompressError) -> PyErr {
    debug!(error = %e, "raising python exception");
    match e {
        CompressError::InvalidArgument(_) | CompressError::InvalidState(_) => {
            PyValueError::new_err(e.to_string())
        }
        CompressError::Resource(_) => PyMemoryError::new_err(e.to_string()),
        CompressError::Backend(_) => PyRuntimeError::new_err(e.to_string()),
        CompressError::Io(_) => PyIOError::new_err(e.to_string()),
    }
}

/// Compressor(format=FORMAT_DEFLATE, verbose=False, iterations=15,
/// block_splitting=1, block_splitting_max=15)
///
/// Buffers all data and compresses it on flush().
#[pyclass(name = "Compressor", module = "rust_deflate")]
pub struct PyCompressor {
    inner: BufferingCompressor,
}

#[pymethods]
impl PyCompressor {
    #[new]
    #[pyo3(signature = (
        format = format_ids::DEFLATE,
        verbose = false,
        iterations = DEFAULT_ITERATIONS as i32,
        block_splitting = 1,
        block_splitting_max = DEFAULT_BLOCK_SPLITTING_MAX as i32
    ))]
    fn new(
        format: i32,
        verbose: bool,
        iterations: i32,
        block_splitting: i32,
        block_splitting_max: i32,
    ) -> PyResult<Self> {
        let inner = BufferingCompressor::from_raw(
            format,
            verbose,
            iterations,
            block_splitting,
            block_splitting_max,
        )
        .map_err(to_py_err)?;
        debug!(options = ?inner.options(), "Compressor created");
        Ok(Self { inner })
    }

    /// compress(data) -> bytes
    ///
    /// `data` is any object exporting a byte buffer.
    fn compress<'py>(&self, py: Python<'py>, data: PyBuffer<u8>) -> PyResult<Bound<'py, PyBytes>> {
        // Copied under the interpreter lock; a bytearray may change once it is released.
        let data = data.to_vec(py)?;
        let out = py.allow_threads(|| self.inner.submit(&data)).map_err(to_py_err)?;
        Ok(PyBytes::new_bound(py, &out))
    }

    /// flush() -> bytes
    ///
    /// The compressor object cannot be used after this method is called.
    fn flush<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyBytes>> {
        let out = py.allow_threads(|| self.inner.finalize()).map_err(to_py_err)?;
        Ok(PyBytes::new_bound(py, &out))
    }

    /// Telemetry snapshot as a JSON string.
    fn telemetry(&self) -> PyResult<String> {
        let snapshot = self.inner.telemetry().map_err(to_py_err)?;
        snapshot
            .to_json()
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }
}

/// Deflater(verbose=False, iterations=15, block_splitting=1,
/// block_splitting_max=15)
///
/// Emits raw DEFLATE incrementally, one chunk behind the caller.
#[pyclass(name = "Deflater", module = "rust_deflate")]
pub struct PyDeflater {
    inner: IncrementalEncoder,
}

#[pymethods]
impl PyDeflater {
    #[new]
    #[pyo3(signature = (
        verbose = false,
        iterations = DEFAULT_ITERATIONS as i32,
        block_splitting = 1,
        block_splitting_max = DEFAULT_BLOCK_SPLITTING_MAX as i32
    ))]
    fn new(verbose: bool, iterations: i32, block_splitting: i32, block_splitting_max: i32) -> Self {
        let inner = IncrementalEncoder::new(verbose, iterations, block_splitting, block_splitting_max);
        debug!(options = ?inner.options(), "Deflater created");
        Self { inner }
    }

    /// compress(data) -> bytes
    fn compress<'py>(&self, py: Python<'py>, data: PyBuffer<u8>) -> PyResult<Bound<'py, PyBytes>> {
        // Copied under the interpreter lock; a bytearray may change once it is released.
        let data = data.to_vec(py)?;
        let out = py.allow_threads(|| self.inner.submit(&data)).map_err(to_py_err)?;
        Ok(PyBytes::new_bound(py, &out))
    }

    /// flush() -> bytes
    ///
    /// The deflater object cannot be used after this method is called.
    fn flush<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyBytes>> {
        let out = py.allow_threads(|| self.inner.finalize()).map_err(to_py_err)?;
        Ok(PyBytes::new_bound(py, &out))
    }

    fn telemetry(&self) -> PyResult<String> {
        let snapshot = self.inner.telemetry().map_err(to_py_err)?;
        snapshot
            .to_json()
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }
}

pub fn register(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyCompressor>()?;
    m.add_class::<PyDeflater>()?;
    m.add("FORMAT_GZIP", format_ids::GZIP)?;
    m.add("FORMAT_ZLIB", format_ids::ZLIB)?;
    m.add("FORMAT_DEFLATE", format_ids::DEFLATE)?;
    Ok(())
}
