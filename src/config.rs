//! Plugin options, the normalized [`Config`] and the session-wide config cell.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;

use crate::error::TransformError;
use crate::processor::CssProcessor;

/// Raw user options, as they appear in a bundler's plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginOptions {
    /// File extensions treated as CSS modules. A missing leading dot is added.
    pub extensions: Vec<String>,
    /// Tag identifier of style templates, e.g. `css` for ``css`...` ``.
    pub namespace: String,
    /// Abort the file on the first compilation failure instead of reporting it.
    pub throw_on_error: bool,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            extensions: vec![".css".to_string()],
            namespace: "css".to_string(),
            throw_on_error: false,
        }
    }
}

impl PluginOptions {
    pub fn from_json(json: &str) -> Result<Self, TransformError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Normalized configuration shared by every file of a build session.
pub struct Config {
    extensions: Regex,
    namespace: String,
    processor: Arc<dyn CssProcessor>,
    throw_on_error: bool,
}

impl Config {
    pub fn from_options(
        options: &PluginOptions,
        processor: Arc<dyn CssProcessor>,
    ) -> Result<Self, TransformError> {
        let alternatives: Vec<String> = options
            .extensions
            .iter()
            .map(|ext| ext.trim())
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                if ext.starts_with('.') {
                    regex::escape(ext)
                } else {
                    regex::escape(&format!(".{ext}"))
                }
            })
            .collect();

        if alternatives.is_empty() {
            return Err(TransformError::Config(
                "at least one extension is required".to_string(),
            ));
        }

        let extensions = Regex::new(&format!("(?:{})$", alternatives.join("|")))
            .map_err(|err| TransformError::Config(err.to_string()))?;

        Ok(Self {
            extensions,
            namespace: options.namespace.clone(),
            processor,
            throw_on_error: options.throw_on_error,
        })
    }

    /// Whether an import or `require()` path names a CSS module.
    pub fn is_managed_resource(&self, path: &str) -> bool {
        self.extensions.is_match(path)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn processor(&self) -> &dyn CssProcessor {
        &*self.processor
    }

    pub fn throw_on_error(&self) -> bool {
        self.throw_on_error
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("extensions", &self.extensions.as_str())
            .field("namespace", &self.namespace)
            .field("throw_on_error", &self.throw_on_error)
            .finish_non_exhaustive()
    }
}

static SESSION: ConfigCell = ConfigCell::new();

/// Holds the [`Config`] of a build session.
///
/// The first successful [`ConfigCell::get_or_init`] wins. Later calls return
/// the same instance even when they pass different options, which mirrors a
/// bundler handing per-file options to a plugin that is configured once.
/// Initialization is race-free when files are processed on several threads.
pub struct ConfigCell {
    inner: OnceCell<Arc<Config>>,
}

impl ConfigCell {
    pub const fn new() -> Self {
        Self {
            inner: OnceCell::new(),
        }
    }

    /// The process-wide cell.
    pub fn global() -> &'static ConfigCell {
        &SESSION
    }

    pub fn get(&self) -> Option<Arc<Config>> {
        self.inner.get().cloned()
    }

    pub fn get_or_init(
        &self,
        options: &PluginOptions,
        processor: Arc<dyn CssProcessor>,
    ) -> Result<Arc<Config>, TransformError> {
        self.inner
            .get_or_try_init(|| {
                tracing::debug!(?options, "initializing css modules config");
                Config::from_options(options, processor).map(Arc::new)
            })
            .cloned()
    }
}

impl Default for ConfigCell {
    fn default() -> Self {
        Self::new()
    }
}
