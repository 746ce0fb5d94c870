//! Matchers compiled into a shared library.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use tracing::debug;

use super::MatchingEngine;
use crate::abi::{AbiDescriptor, CALLBACK_COUNT, DESCRIPTOR_SYMBOL, DescriptorFn, EntryPoint};
use crate::config::RuntimeConfig;
use crate::error::RuntimeError;

const ENGINE_TARGET: &str = "peg_runtime::engine";

/// A loaded matcher module.
///
/// The module must export [`DESCRIPTOR_SYMBOL`] and one entry point per rule
/// named `<rule><suffix>`. Entry points handed out by
/// [`MatchingEngine::entry_point`] stay valid for as long as the engine is
/// alive.
#[derive(Debug)]
pub struct NativeEngine {
    library: Library,
    path: PathBuf,
    entry_suffix: String,
}

impl NativeEngine {
    /// Loads the module at `path` with the default configuration.
    ///
    /// # Errors
    ///
    /// As for [`Self::load_with_config`].
    ///
    /// # Safety
    ///
    /// As for [`Self::load_with_config`].
    pub unsafe fn load(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        // SAFETY: forwarded to the caller.
        unsafe { Self::load_with_config(path, &RuntimeConfig::default()) }
    }

    /// Loads the module at `path` and checks the ABI it was built for.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ModuleLoad`] when the library cannot be
    /// opened or lacks the ABI descriptor, and [`RuntimeError::AbiMismatch`]
    /// when it targets a different callback table.
    ///
    /// # Safety
    ///
    /// Loading runs the library's initialisers. The library must be a
    /// matcher module: its descriptor export and every `<rule><suffix>`
    /// export must have the signatures [`DescriptorFn`] and [`EntryPoint`].
    pub unsafe fn load_with_config(
        path: impl AsRef<Path>,
        config: &RuntimeConfig,
    ) -> Result<Self, RuntimeError> {
        let module_path = path.as_ref().to_path_buf();
        // SAFETY: forwarded to the caller.
        let library = unsafe { Library::new(&module_path) }.map_err(|source| {
            RuntimeError::ModuleLoad {
                path: module_path.clone(),
                message: String::from("the dynamic loader rejected the module"),
                source: Some(Arc::new(source)),
            }
        })?;
        // SAFETY: the caller guarantees the descriptor signature.
        let abi = unsafe { read_descriptor(&library) }.map_err(|source| {
            RuntimeError::ModuleLoad {
                path: module_path.clone(),
                message: format!("module does not export `{DESCRIPTOR_SYMBOL}`"),
                source: Some(Arc::new(source)),
            }
        })?;
        if !abi.is_compatible() {
            return Err(RuntimeError::AbiMismatch {
                path: module_path,
                found_version: abi.version,
                found_callbacks: abi.callback_count,
                expected_version: AbiDescriptor::CURRENT.version,
                expected_callbacks: CALLBACK_COUNT,
            });
        }
        debug!(
            target: ENGINE_TARGET,
            path = %module_path.display(),
            version = abi.version,
            "loaded matcher module"
        );
        Ok(Self {
            library,
            path: module_path,
            entry_suffix: config.entry_suffix().to_owned(),
        })
    }

    /// Returns the path the module was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the suffix appended to rule names.
    #[must_use]
    pub fn entry_suffix(&self) -> &str {
        &self.entry_suffix
    }

    /// Returns the symbol looked up for `rule`.
    #[must_use]
    pub fn symbol(&self, rule: &str) -> String {
        format!("{rule}{}", self.entry_suffix)
    }
}

impl MatchingEngine for NativeEngine {
    fn entry_point(&self, rule: &str) -> Result<EntryPoint, RuntimeError> {
        let symbol = self.symbol(rule);
        // SAFETY: `load_with_config` obliged the caller to provide a module
        // whose rule exports have the `EntryPoint` signature.
        let entry = unsafe { self.library.get::<EntryPoint>(symbol.as_bytes()) }.map_err(|_| {
            RuntimeError::EntryNotFound {
                rule: rule.to_owned(),
                symbol: symbol.clone(),
            }
        })?;
        Ok(*entry)
    }
}

/// Calls the module's ABI descriptor export.
///
/// # Safety
///
/// The export, when present, must have the [`DescriptorFn`] signature.
unsafe fn read_descriptor(library: &Library) -> Result<AbiDescriptor, libloading::Error> {
    // SAFETY: guaranteed by the caller.
    unsafe {
        let describe = library.get::<DescriptorFn>(DESCRIPTOR_SYMBOL.as_bytes())?;
        Ok(describe())
    }
}
