//! Build configuration, optionally loaded from a TOML file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::info_plist::InfoPlist;
use crate::core::policy::MinTkPolicy;

/// Bundle builder configuration (TOML).
///
/// Every field has a default matching the ProperTree bundle, so an empty file
/// (or no file at all) yields a working configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildConfig {
    /// Bundle and launcher base name (`<app_name>.app`, `<app_name>.py`).
    pub app_name: String,

    pub bundle_identifier: String,

    pub copyright: String,

    /// Interpreter names searched on `PATH` when no explicit path is given.
    pub interpreter_names: Vec<String>,

    /// Minimum Tk version keyed by OS version (e.g. `"11" = "8.6"`).
    pub min_tk: BTreeMap<String, String>,

    /// Bundle-relative files kept across rebuilds.
    pub preserve_paths: Vec<String>,

    /// Seconds to wait on the Tk liveness check before warning about dialogs.
    pub liveness_warning_secs: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            app_name: "ProperTree".to_string(),
            bundle_identifier: "com.corpnewt.ProperTree".to_string(),
            copyright: "Copyright 2019 CorpNewt".to_string(),
            interpreter_names: vec!["python".to_string(), "python3".to_string()],
            min_tk: BTreeMap::from([("11".to_string(), "8.6".to_string())]),
            preserve_paths: vec![
                "Contents/MacOS/Scripts/settings.json".to_string(),
                "Contents/MacOS/Configuration.tex".to_string(),
            ],
            liveness_warning_secs: 5,
        }
    }
}

impl BuildConfig {
    pub fn validate(&self) -> Result<()> {
        if self.app_name.trim().is_empty() || self.app_name.contains('/') {
            return Err(anyhow!("app_name must be a non-empty file name"));
        }
        if self.interpreter_names.is_empty()
            || self.interpreter_names.iter().any(|n| n.trim().is_empty())
        {
            return Err(anyhow!("interpreter_names must be a non-empty array of names"));
        }
        if self.liveness_warning_secs == 0 {
            return Err(anyhow!("liveness_warning_secs must be > 0"));
        }
        for path in &self.preserve_paths {
            let relative = Path::new(path);
            let escapes = relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if path.trim().is_empty() || escapes {
                return Err(anyhow!(
                    "preserve_paths entry {path:?} must be relative to the bundle"
                ));
            }
        }
        self.min_tk_policy()?;
        Ok(())
    }

    pub fn min_tk_policy(&self) -> Result<MinTkPolicy> {
        MinTkPolicy::from_pairs(
            self.min_tk
                .iter()
                .map(|(os, tk)| (os.as_str(), tk.as_str())),
        )
    }

    pub fn liveness_warning(&self) -> Duration {
        Duration::from_secs(self.liveness_warning_secs)
    }

    pub fn info_plist(&self) -> InfoPlist {
        InfoPlist::for_app(&self.app_name, &self.bundle_identifier, &self.copyright)
    }
}

/// Load config from a TOML file.
///
/// With no path, returns `BuildConfig::default()`. An explicit path must exist.
pub fn load_config(path: Option<&Path>) -> Result<BuildConfig> {
    let Some(path) = path else {
        let cfg = BuildConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    };
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BuildConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}
