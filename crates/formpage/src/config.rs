use formpage_core::{EngineConfig, FormValues};

use crate::prelude::*;

/// Configuration from `--config` / `FORMPAGE_CONFIG`, or the defaults.
pub fn load(global: &crate::Global) -> Result<EngineConfig> {
    match &global.config {
        Some(path) => {
            let config = EngineConfig::from_toml_file(path)
                .map_err(|e| eyre!(e))
                .wrap_err_with(|| f!("Failed to load config from {}", path.display()))?;
            log::debug!("loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Values from a JSON object file, or an empty set.
pub fn load_values(path: Option<&std::path::Path>) -> Result<FormValues> {
    let Some(path) = path else {
        return Ok(FormValues::new());
    };
    let source = std::fs::read_to_string(path)
        .wrap_err_with(|| f!("Failed to read values from {}", path.display()))?;
    FormValues::from_json_str(&source)
        .map_err(|e| eyre!(e))
        .wrap_err_with(|| f!("Invalid values file {}", path.display()))
}
