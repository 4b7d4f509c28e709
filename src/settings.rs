//! Runtime settings.
//!
//! Values come from an optional settings file, overridden by `DOCJOIN_*`
//! environment variables, e.g. `DOCJOIN_MAX_DEPTH=8`.

use std::path::Path;

// config lets you read a separate settings file layered under the environment
use config::{Config, Environment, File, Map};
use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_MAX_DEPTH: usize = 32;
pub const ENVIRONMENT_PREFIX: &str = "DOCJOIN";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    max_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, None)
    }
    /// Like [`Settings::load`], reading `DOCJOIN_*` variables from `environment`
    /// instead of the process environment when one is given.
    pub fn load_from(path: Option<&Path>, environment: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENVIRONMENT_PREFIX)
                    .try_parsing(true)
                    .source(environment),
            )
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }
    /// How many documents may be under resolution at once, the root included.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
