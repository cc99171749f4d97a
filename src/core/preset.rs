//! CMake preset catalog
//!
//! Loads `CMakePresets.json` and indexes its configure and build presets.
//! Only the fields the pipeline needs are read; everything else in the
//! document is ignored. Preset inheritance is left to CMake, with one
//! exception: [`PresetCatalog::build_type`] follows `inherits` so packages
//! get the right build type in their name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::config::defaults::SOURCE_DIR_PLACEHOLDER;
use crate::error::PresetError;

/// Cache variable carrying the build type
pub const BUILD_TYPE_VARIABLE: &str = "CMAKE_BUILD_TYPE";

/// A cache variable value as CMake presets allow it to be written
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CacheValue {
    /// `"KEY": "value"`
    Text(String),
    /// `"KEY": true`
    Flag(bool),
    /// `"KEY": { "type": "BOOL", "value": "ON" }`
    Typed {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        value: ScalarValue,
    },
}

/// Scalar inside the object form of a cache variable
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Text(String),
    Flag(bool),
}

impl ScalarValue {
    fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Flag(true) => "TRUE".to_string(),
            Self::Flag(false) => "FALSE".to_string(),
        }
    }
}

impl CacheValue {
    /// The value as CMake would see it on the command line
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Flag(b) => ScalarValue::Flag(*b).as_text(),
            Self::Typed { value, .. } => value.as_text(),
        }
    }
}

/// A configure preset
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurePreset {
    /// Unique preset name
    pub name: String,
    /// Human readable name, defaults to `name`
    pub display_name: String,
    /// Free-form description
    pub description: String,
    /// Binary directory template, may contain `${sourceDir}`
    pub binary_dir: String,
    /// Names of presets this one inherits from
    pub inherits: Vec<String>,
    /// Cache variables passed to CMake
    pub cache_variables: BTreeMap<String, CacheValue>,
    /// Platform condition, kept opaque
    pub condition: Option<serde_json::Value>,
    /// Environment overlay; `None` unsets the variable
    pub environment: BTreeMap<String, Option<String>>,
}

impl ConfigurePreset {
    /// Expand the binary directory template against the project root
    ///
    /// This is a plain replacement of `${sourceDir}`; no other CMake macro
    /// is expanded.
    pub fn binary_dir_for(&self, project_root: &Path) -> PathBuf {
        let root = project_root.to_string_lossy();
        PathBuf::from(self.binary_dir.replace(SOURCE_DIR_PLACEHOLDER, &root))
    }
}

/// A build preset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPreset {
    /// Unique preset name
    pub name: String,
    /// Name of the configure preset this build preset drives
    pub configure_preset: String,
}

/// One line of `--list-presets` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetSummary {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub build_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default)]
    configure_presets: Vec<RawConfigurePreset>,
    #[serde(default)]
    build_presets: Vec<RawBuildPreset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfigurePreset {
    name: Option<String>,
    display_name: Option<String>,
    description: Option<String>,
    binary_dir: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    inherits: Vec<String>,
    #[serde(default)]
    cache_variables: BTreeMap<String, CacheValue>,
    condition: Option<serde_json::Value>,
    #[serde(default)]
    environment: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBuildPreset {
    name: Option<String>,
    configure_preset: Option<String>,
}

/// `inherits` may be a single name or a list of names
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    })
}

/// All presets from one `CMakePresets.json`
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    path: PathBuf,
    configure: Vec<ConfigurePreset>,
    build: Vec<BuildPreset>,
}

impl PresetCatalog {
    /// Load and index a presets document
    pub fn load(path: &Path) -> Result<Self, PresetError> {
        if !path.is_file() {
            return Err(PresetError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| PresetError::MalformedConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_json(path, &content)
    }

    /// Parse a presets document already in memory
    ///
    /// `path` is only used in error messages.
    pub fn from_json(path: &Path, content: &str) -> Result<Self, PresetError> {
        let malformed = |message: String| PresetError::MalformedConfig {
            path: path.to_path_buf(),
            message,
        };

        let raw: RawDocument =
            serde_json::from_str(content).map_err(|e| malformed(e.to_string()))?;

        let mut configure = Vec::with_capacity(raw.configure_presets.len());
        for (index, preset) in raw.configure_presets.into_iter().enumerate() {
            let name = preset
                .name
                .ok_or_else(|| malformed(format!("configurePresets[{index}] is missing 'name'")))?;
            if configure.iter().any(|p: &ConfigurePreset| p.name == name) {
                return Err(malformed(format!("duplicate configure preset '{name}'")));
            }

            configure.push(ConfigurePreset {
                display_name: preset.display_name.unwrap_or_else(|| name.clone()),
                description: preset.description.unwrap_or_default(),
                binary_dir: preset
                    .binary_dir
                    .unwrap_or_else(|| format!("{SOURCE_DIR_PLACEHOLDER}/build/{name}")),
                inherits: preset.inherits,
                cache_variables: preset.cache_variables,
                condition: preset.condition,
                environment: preset.environment,
                name,
            });
        }

        let mut build = Vec::with_capacity(raw.build_presets.len());
        for (index, preset) in raw.build_presets.into_iter().enumerate() {
            let name = preset
                .name
                .ok_or_else(|| malformed(format!("buildPresets[{index}] is missing 'name'")))?;
            if build.iter().any(|p: &BuildPreset| p.name == name) {
                return Err(malformed(format!("duplicate build preset '{name}'")));
            }

            let Some(configure_preset) = preset.configure_preset else {
                tracing::debug!("Skipping build preset '{name}' without a configurePreset");
                continue;
            };

            build.push(BuildPreset {
                name,
                configure_preset,
            });
        }

        tracing::debug!(
            "Loaded {} configure and {} build presets from {}",
            configure.len(),
            build.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            configure,
            build,
        })
    }

    /// Path the catalog was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configure presets in document order
    pub fn configure_presets(&self) -> &[ConfigurePreset] {
        &self.configure
    }

    /// Build presets in document order
    pub fn build_presets(&self) -> &[BuildPreset] {
        &self.build
    }

    /// Names of all build presets in document order
    pub fn available_presets(&self) -> Vec<String> {
        self.build.iter().map(|p| p.name.clone()).collect()
    }

    /// Look up a configure preset by name
    pub fn configure_preset(&self, name: &str) -> Option<&ConfigurePreset> {
        self.configure.iter().find(|p| p.name == name)
    }

    /// Look up a build preset by name
    pub fn build_preset(&self, name: &str) -> Result<&BuildPreset, PresetError> {
        self.build
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| PresetError::UnknownPreset {
                name: name.to_string(),
                available: self.available_presets(),
            })
    }

    /// Resolve a build preset to the configure preset it references
    pub fn resolve_build_preset(&self, name: &str) -> Result<&ConfigurePreset, PresetError> {
        let build = self.build_preset(name)?;
        self.configure_preset(&build.configure_preset)
            .ok_or_else(|| PresetError::DanglingReference {
                build: build.name.clone(),
                configure: build.configure_preset.clone(),
            })
    }

    /// Binary directory of a build preset with `${sourceDir}` expanded
    pub fn resolve_binary_dir(
        &self,
        name: &str,
        project_root: &Path,
    ) -> Result<PathBuf, PresetError> {
        Ok(self.resolve_build_preset(name)?.binary_dir_for(project_root))
    }

    /// `CMAKE_BUILD_TYPE` of a build preset, following `inherits`
    pub fn build_type(&self, name: &str) -> Result<Option<String>, PresetError> {
        let preset = self.resolve_build_preset(name)?;
        let mut visited = Vec::new();
        Ok(self.lookup_cache_variable(preset, BUILD_TYPE_VARIABLE, &mut visited))
    }

    fn lookup_cache_variable<'a>(
        &'a self,
        preset: &'a ConfigurePreset,
        key: &str,
        visited: &mut Vec<&'a str>,
    ) -> Option<String> {
        if visited.contains(&preset.name.as_str()) {
            return None;
        }
        visited.push(&preset.name);

        if let Some(value) = preset.cache_variables.get(key) {
            return Some(value.as_text());
        }

        preset
            .inherits
            .iter()
            .filter_map(|parent| self.configure_preset(parent))
            .find_map(|parent| self.lookup_cache_variable(parent, key, visited))
    }

    /// Summaries of every build preset for listing
    pub fn summaries(&self) -> Vec<PresetSummary> {
        self.build
            .iter()
            .map(|build| match self.resolve_build_preset(&build.name) {
                Ok(configure) => PresetSummary {
                    name: build.name.clone(),
                    display_name: configure.display_name.clone(),
                    description: configure.description.clone(),
                    build_type: self.build_type(&build.name).ok().flatten(),
                },
                Err(_) => PresetSummary {
                    name: build.name.clone(),
                    display_name: build.name.clone(),
                    description: format!(
                        "references missing configure preset '{}'",
                        build.configure_preset
                    ),
                    build_type: None,
                },
            })
            .collect()
    }
}
