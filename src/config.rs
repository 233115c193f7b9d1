//! Configuration module: every tunable setting of the pipeline lives here
//!
//! Defaults and environment variable names are kept together so a model or
//! path change only touches this file.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};

/// Ollama service address
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// On-disk location of the vector store
pub const DEFAULT_VECTOR_DB_PATH: &str = "./data/vector_db";

/// Ollama embedding model name
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Ollama generation model name
pub const DEFAULT_LLM_MODEL: &str = "llama3.2";

/// Characters per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Characters shared by adjacent chunks
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

pub const ENV_OLLAMA_BASE_URL: &str = "OLLAMA_BASE_URL";
pub const ENV_VECTOR_DB_PATH: &str = "VECTOR_DB_PATH";
pub const ENV_EMBEDDING_MODEL: &str = "EMBEDDING_MODEL";
pub const ENV_LLM_MODEL: &str = "LLM_MODEL";
pub const ENV_CHUNK_SIZE: &str = "CHUNK_SIZE";
pub const ENV_CHUNK_OVERLAP: &str = "CHUNK_OVERLAP";

/// Application settings
///
/// Built once at startup and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Ollama endpoint (embedding and generation)
    pub ollama_base_url: String,
    /// Vector store directory
    pub vector_db_path: PathBuf,
    /// Embedding model name
    pub embedding_model: String,
    /// Generation model name
    pub llm_model: String,
    /// Maximum characters per chunk
    pub chunk_size: usize,
    /// Overlap between adjacent chunks, in characters
    pub chunk_overlap: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Built-in defaults, no environment involved
    pub fn new() -> Self {
        Self {
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            vector_db_path: PathBuf::from(DEFAULT_VECTOR_DB_PATH),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }

    /// Read settings from the process environment, falling back to defaults
    ///
    /// Fails with [`ConfigError::Format`] when `CHUNK_SIZE` or
    /// `CHUNK_OVERLAP` is set to something that is not an integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(process_env)
    }

    /// Build settings from an arbitrary variable lookup
    ///
    /// # Arguments
    /// - `lookup`: returns the value of a variable, or `None` when unset
    ///
    /// Present string values are taken verbatim (empty included). Integer
    /// values may carry surrounding whitespace.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            ollama_base_url: string_var(&lookup, ENV_OLLAMA_BASE_URL, DEFAULT_OLLAMA_BASE_URL),
            vector_db_path: string_var(&lookup, ENV_VECTOR_DB_PATH, DEFAULT_VECTOR_DB_PATH).into(),
            embedding_model: string_var(&lookup, ENV_EMBEDDING_MODEL, DEFAULT_EMBEDDING_MODEL),
            llm_model: string_var(&lookup, ENV_LLM_MODEL, DEFAULT_LLM_MODEL),
            chunk_size: usize_var(&lookup, ENV_CHUNK_SIZE, DEFAULT_CHUNK_SIZE)?,
            chunk_overlap: usize_var(&lookup, ENV_CHUNK_OVERLAP, DEFAULT_CHUNK_OVERLAP)?,
        };

        config.warn_on_chunk_bounds();
        Ok(config)
    }

    /// Layer a `.env` file underneath the process environment
    ///
    /// Variables already set in the process win over the file, the file
    /// wins over defaults. The process environment is left untouched.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_vars = read_env_file(path)?;
        debug!(path = %path.display(), vars = file_vars.len(), "using env file");

        layered(process_env, &file_vars)
    }

    /// Startup entry point
    ///
    /// Uses the nearest `.env` in the current directory or its parents when
    /// one exists, otherwise behaves like [`Config::from_env`].
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        load_from(&cwd, process_env)
    }

    fn warn_on_chunk_bounds(&self) {
        if self.chunk_size == 0 {
            warn!("chunk_size is 0");
        } else if self.chunk_overlap >= self.chunk_size {
            warn!(
                chunk_size = self.chunk_size,
                chunk_overlap = self.chunk_overlap,
                "chunk_overlap is not smaller than chunk_size"
            );
        }
    }
}

// Non-UTF-8 values are read lossily instead of being treated as unset.
fn process_env(name: &str) -> Option<String> {
    std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
}

fn layered<F>(env: F, file_vars: &HashMap<String, String>) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    Config::from_lookup(|name| env(name).or_else(|| file_vars.get(name).cloned()))
}

fn load_from<F>(start: &Path, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(path) = find_env_file(start) else {
        debug!(start = %start.display(), "no .env file found, reading process environment only");
        return Config::from_lookup(env);
    };

    let file_vars = read_env_file(&path)?;
    debug!(path = %path.display(), vars = file_vars.len(), "using .env file");
    layered(env, &file_vars)
}

/// Nearest `.env` walking up from `start`
fn find_env_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".env"))
        .find(|candidate| candidate.is_file())
}

// dotenv 0.15 deprecates its file iterator without shipping a replacement.
#[allow(deprecated)]
fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let to_error = |source: dotenv::Error| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    };

    dotenv::from_path_iter(path)
        .map_err(to_error)?
        .collect::<dotenv::Result<HashMap<_, _>>>()
        .map_err(to_error)
}

fn string_var<F>(lookup: &F, var: &'static str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) => {
            debug!(var, "override from environment");
            value
        }
        None => default.to_string(),
    }
}

fn usize_var<F>(lookup: &F, var: &'static str, default: usize) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };

    let value = raw
        .trim()
        .parse::<usize>()
        .map_err(|source| ConfigError::Format {
            var,
            value: raw.clone(),
            source,
        })?;

    debug!(var, value, "override from environment");
    Ok(value)
}
