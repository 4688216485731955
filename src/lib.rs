use modlev_core::python::levels;
use pyo3::prelude::*;
use pyo3::wrap_pymodule;

#[pymodule]
#[pyo3(name = "_lib")]
fn modlev(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_wrapped(wrap_pymodule!(levels))?;

    set_path(m, "modlev._lib.levels", "levels")?;

    Ok(())
}

/// Register a submodule in `sys.modules` so `import modlev._lib.levels` works
fn set_path(m: &Bound<'_, PyModule>, path: &str, module: &str) -> PyResult<()> {
    let sys = PyModule::import_bound(m.py(), "sys")?;
    sys.getattr("modules")?.set_item(path, m.getattr(module)?)
}
