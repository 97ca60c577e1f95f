use crate::{DEFAULT_BASE_URL, DEFAULT_MODEL, Result, runtime_dir, user_runtime_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub tools: ToolsConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub command_timeout_seconds: u64,
    pub max_search_results: usize,
    /// Glob patterns searched by `SEARCH:` when no pattern is given.
    pub search_patterns: Vec<String>,
    pub function_pattern: String,
    pub import_pattern: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            command_timeout_seconds: 30,
            max_search_results: 20,
            search_patterns: ["*.py", "*.js", "*.ts", "*.java", "*.cpp", "*.c", "*.h"]
                .into_iter()
                .map(ToString::to_string)
                .collect(),
            function_pattern: "*.py".to_string(),
            import_pattern: "*.py".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Line-editing history file. Defaults to `~/.ollama_agent_history`.
    pub history_file: Option<String>,
    pub history_limit: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            history_file: None,
            history_limit: 1000,
        }
    }
}

impl UiConfig {
    pub fn history_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.history_file {
            return Some(PathBuf::from(path));
        }
        let home = std::env::var("HOME")
            .ok()
            .or_else(|| std::env::var("USERPROFILE").ok())?;
        Some(Path::new(&home).join(".ollama_agent_history"))
    }
}

impl AppConfig {
    pub fn user_settings_path() -> Option<PathBuf> {
        user_runtime_dir().map(|dir| dir.join("settings.json"))
    }

    pub fn project_settings_path(workspace: &Path) -> PathBuf {
        runtime_dir(workspace).join("settings.json")
    }

    pub fn project_toml_path(workspace: &Path) -> PathBuf {
        runtime_dir(workspace).join("config.toml")
    }

    /// Loads defaults, then `config.toml`, user settings and project
    /// settings, each layer overriding the keys it sets.
    pub fn load(workspace: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        if let Some(user) = Self::user_settings_path() {
            paths.push(user);
        }
        paths.push(Self::project_settings_path(workspace));
        Self::load_layers(&Self::project_toml_path(workspace), &paths)
    }

    fn load_layers(toml_path: &Path, json_paths: &[PathBuf]) -> Result<Self> {
        let mut merged = serde_json::to_value(Self::default())?;

        if toml_path.exists() {
            let raw = fs::read_to_string(toml_path)?;
            let table: toml::Table = toml::from_str(&raw)?;
            merge_json_value(&mut merged, &serde_json::to_value(table)?);
        }

        for path in json_paths {
            if !path.exists() {
                continue;
            }
            let raw = fs::read_to_string(path)?;
            let value: serde_json::Value = serde_json::from_str(&raw)?;
            merge_json_value(&mut merged, &value);
        }

        Ok(serde_json::from_value(merged)?)
    }

    /// Applies command-line overrides on top of the file layers.
    pub fn apply_overrides(&mut self, model: Option<&str>, base_url: Option<&str>) {
        if let Some(model) = model {
            self.llm.model = model.to_string();
        }
        if let Some(base_url) = base_url {
            self.llm.base_url = base_url.trim_end_matches('/').to_string();
        }
    }
}

fn merge_json_value(base: &mut serde_json::Value, overlay: &serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base_obj), serde_json::Value::Object(overlay_obj)) => {
            for (key, overlay_value) in overlay_obj {
                if let Some(base_value) = base_obj.get_mut(key) {
                    merge_json_value(base_value, overlay_value);
                } else {
                    base_obj.insert(key.clone(), overlay_value.clone());
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}
