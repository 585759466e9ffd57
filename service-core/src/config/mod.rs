//! Layered configuration loading.
//!
//! Every service keeps a `config/base.yaml` next to its `Cargo.toml`; values
//! can be overridden with `APP_`-prefixed environment variables using `__` as
//! the nesting separator (e.g. `APP_SERVER__PORT=9000`).

use crate::error::AppError;
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Locate `<service>/config` whether the process runs from the workspace root
/// or from inside the service directory.
pub fn configuration_directory(service_dir: &str) -> Result<PathBuf, AppError> {
    let base_path = std::env::current_dir()?;

    if base_path.ends_with(service_dir) {
        Ok(base_path.join("config"))
    } else {
        Ok(base_path.join(service_dir).join("config"))
    }
}

/// Load `base.yaml` from `directory` and apply `APP_` overrides.
pub fn load_from<T: DeserializeOwned>(directory: &Path) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let settings = Config::builder()
        .add_source(File::from(directory.join("base.yaml")).required(true))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}

/// Load the configuration of `service_dir`.
pub fn get_configuration<T: DeserializeOwned>(service_dir: &str) -> Result<T, AppError> {
    let directory = configuration_directory(service_dir)?;
    load_from(&directory)
}
