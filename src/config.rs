use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use serde_yaml;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::routing::{Configure, DEFAULT_SORT_BY};

#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "Runs the storefront service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".storefront")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    port: u16,
    /// Public base URL used to rebuild request URLs behind a proxy.
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default = "default_featured_collections")]
    pub featured_collections: Vec<String>,
}

fn default_featured_collections() -> Vec<String> {
    vec!["firstHandle".to_string(), "secondHandle".to_string()]
}

impl App {
    pub fn get_port(&self) -> u16 {
        return self.port;
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SortOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Search {
    pub app_id: String,
    pub api_key: String,
    /// Overrides the default `https://{app_id}-dsn.algolia.net` host.
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_index_name")]
    pub index_name: String,
    #[serde(default)]
    pub facets: Vec<String>,
    #[serde(default = "default_sort_options")]
    pub sort_options: Vec<SortOption>,
    /// Filter template applied to collection pages, `{handle}` is substituted.
    #[serde(default)]
    pub collection_filter: Option<String>,
    #[serde(default)]
    pub configure: Configure,
}

fn default_index_name() -> String {
    DEFAULT_SORT_BY.to_string()
}

fn default_sort_options() -> Vec<SortOption> {
    ["products", "products_recently_ordered_count_desc"]
        .into_iter()
        .map(|value| SortOption {
            label: value.to_string(),
            value: value.to_string(),
        })
        .collect()
}

impl Search {
    pub fn get_host(&self) -> String {
        match &self.host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}-dsn.algolia.net", self.app_id),
        }
    }

    /// Static search parameters for the collection identified by `handle`.
    pub fn collection_configure(&self, handle: &str) -> Configure {
        let mut configure = self.configure.clone();
        if let Some(template) = &self.collection_filter {
            let filter = template.replace("{handle}", handle);
            configure.filters = Some(match configure.filters.take() {
                Some(existing) if !existing.is_empty() => format!("({existing}) AND {filter}"),
                _ => filter,
            });
        }
        configure
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: App,
    pub search: Search,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    pub fn from_yaml_str(yaml_str: &str) -> Result<Self> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml_str(&yaml_str)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!(var = var_name, "environment variable not found");
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}
