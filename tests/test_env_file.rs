/// Integration tests: `.env` layering and process environment loading
///
/// Run with: cargo test --test test_env_file -- --nocapture
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use finvise::config::{
    ENV_CHUNK_OVERLAP, ENV_CHUNK_SIZE, ENV_EMBEDDING_MODEL, ENV_LLM_MODEL, ENV_VECTOR_DB_PATH,
};
use finvise::{Config, ConfigError};
use tempfile::NamedTempFile;

/// Value the process environment would contribute, read only
fn env_or(var: &str, fallback: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| fallback.to_string())
}

fn env_file(contents: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[test]
fn test_env_file_overrides_defaults() -> Result<()> {
    let file = env_file(
        "# local model setup\n\
         LLM_MODEL=mistral\n\
         VECTOR_DB_PATH=/srv/finvise/vectors\n\
         CHUNK_SIZE=\"750\"\n",
    )?;

    let config = Config::from_env_file(file.path())?;

    assert_eq!(config.llm_model, env_or(ENV_LLM_MODEL, "mistral"));
    assert_eq!(
        config.vector_db_path,
        PathBuf::from(env_or(ENV_VECTOR_DB_PATH, "/srv/finvise/vectors"))
    );
    if std::env::var(ENV_CHUNK_SIZE).is_err() {
        assert_eq!(config.chunk_size, 750);
    }
    assert_eq!(
        config.embedding_model,
        env_or(ENV_EMBEDDING_MODEL, "nomic-embed-text")
    );
    Ok(())
}

#[test]
fn test_env_file_with_invalid_integer() -> Result<()> {
    if std::env::var(ENV_CHUNK_OVERLAP).is_ok() {
        println!("CHUNK_OVERLAP set in the environment, skipping");
        return Ok(());
    }

    let file = env_file("CHUNK_OVERLAP=lots\n")?;
    let err = Config::from_env_file(file.path()).unwrap_err();

    assert!(
        matches!(err, ConfigError::Format { var: "CHUNK_OVERLAP", .. }),
        "unexpected error: {err:?}"
    );
    Ok(())
}

#[test]
fn test_missing_env_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("does-not-exist.env");

    let err = Config::from_env_file(&missing).unwrap_err();

    match err {
        ConfigError::EnvFile { path, .. } => assert_eq!(path, missing),
        other => panic!("expected env file error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_malformed_env_file() -> Result<()> {
    let file = env_file("LLM_MODEL=mistral\nthis line is not an assignment\n")?;

    let err = Config::from_env_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::EnvFile { .. }));
    Ok(())
}

#[test]
fn test_from_env_is_repeatable() -> Result<()> {
    match (Config::from_env(), Config::from_env()) {
        (Ok(first), Ok(second)) => assert_eq!(first, second),
        // A bad CHUNK_SIZE/CHUNK_OVERLAP in the outer environment fails both calls alike
        (Err(ConfigError::Format { .. }), Err(ConfigError::Format { .. })) => {}
        (first, second) => panic!("inconsistent results: {first:?} / {second:?}"),
    }
    Ok(())
}

#[test]
fn test_config_is_shareable_across_threads() -> Result<()> {
    let config = std::sync::Arc::new(Config::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let config = config.clone();
            std::thread::spawn(move || config.chunk_size)
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("reader thread panicked"), 1000);
    }
    Ok(())
}
