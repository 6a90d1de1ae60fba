//! Resolution of CSS module paths to their raw contents.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

/// Loads the raw contents of a CSS module referenced from `filename`.
pub trait ModuleLoader {
    fn load(&self, filename: &str, resource_path: &str) -> io::Result<String>;
}

/// Reads modules from disk.
///
/// Relative paths resolve against the directory of the importing file. Bare
/// specifiers (`pkg/theme.css`) resolve against the module root, if one is set.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    module_root: Option<PathBuf>,
}

impl FsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.module_root = Some(root.into());
        self
    }

    pub fn resolve(&self, filename: &str, resource_path: &str) -> io::Result<PathBuf> {
        let path = Path::new(resource_path);

        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }

        if resource_path.starts_with("./") || resource_path.starts_with("../") {
            let base = Path::new(filename).parent().unwrap_or(Path::new(""));
            return Ok(base.join(path));
        }

        match &self.module_root {
            Some(root) => Ok(root.join(path)),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("cannot resolve bare specifier `{resource_path}` without a module root"),
            )),
        }
    }
}

impl ModuleLoader for FsLoader {
    fn load(&self, filename: &str, resource_path: &str) -> io::Result<String> {
        let path = self.resolve(filename, resource_path)?;
        tracing::trace!(path = %path.display(), "loading css module");
        fs::read_to_string(path)
    }
}

/// Serves modules from memory, keyed by the path exactly as written in source.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    modules: FxHashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource_path: impl Into<String>, contents: impl Into<String>) {
        self.modules.insert(resource_path.into(), contents.into());
    }

    pub fn with(mut self, resource_path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(resource_path, contents);
        self
    }
}

impl ModuleLoader for MemoryLoader {
    fn load(&self, _filename: &str, resource_path: &str) -> io::Result<String> {
        self.modules.get(resource_path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no module registered for `{resource_path}`"),
            )
        })
    }
}
