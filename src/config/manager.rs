use super::{
    barrier::BarrierConfig, events::EventConfig, features::FeatureConfig, ml::MlConfig,
    simulation::SimulationConfig, traits::ConfigSection,
};
use crate::error::TribarrierError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub barrier: BarrierConfig,
    pub events: EventConfig,
    pub features: FeatureConfig,
    pub ml: MlConfig,
    pub simulation: SimulationConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), TribarrierError> {
        self.barrier.validate()?;
        self.events.validate()?;
        self.features.validate()?;
        self.ml.validate()?;
        self.simulation.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TribarrierError> {
        let contents = std::fs::read_to_string(path)?;

        let config: AppConfig = toml::from_str(&contents).map_err(|e| {
            TribarrierError::invalid_config("config", format!("failed to parse TOML: {}", e))
        })?;

        config.validate()?;

        *self.config.write().unwrap() = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TribarrierError> {
        let config = self.config.read().unwrap();
        let toml_str = toml::to_string_pretty(&*config).map_err(|e| {
            TribarrierError::invalid_config("config", format!("failed to serialize: {}", e))
        })?;

        std::fs::write(path, toml_str)?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap().clone()
    }

    pub fn update<F>(&self, f: F) -> Result<(), TribarrierError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap();
        f(&mut config);
        config.validate()?;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_round_trip_preserves_config() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(
            parsed.barrier.profit_multiple,
            config.barrier.profit_multiple
        );
        assert_eq!(parsed.ml.embargo, config.ml.embargo);
    }

    #[test]
    fn update_rejects_invalid_state() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.barrier.stop_multiple = -1.0);
        assert!(result.is_err());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let parsed: AppConfig = toml::from_str("[barrier]\nprofit_multiple = 3.0\n").unwrap();
        assert_eq!(parsed.barrier.profit_multiple, 3.0);
        assert_eq!(parsed.barrier.stop_multiple, 1.0);
    }
}
