//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable (`CONFIG`)
//! de la que sale el `EngineOptions` del pipeline.
use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use log::warn;
use once_cell::sync::Lazy;
use pipeline_core::EngineOptions;
use serde::Serialize;

use crate::errors::ConfigError;

pub const DEFAULT_NAME: &str = "operator-pipeline";
pub const DEFAULT_FRAME_MS: u64 = 50;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Configuración del pipeline y de la demo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    /// Nombre usado en los logs del engine (`PIPELINE_NAME`).
    pub name: String,
    /// Loguea la clasificación de cada step (`PIPELINE_TRACE_STEPS`).
    pub trace_steps: bool,
    /// Duración de un frame en la demo (`PIPELINE_DEMO_FRAME_MS`).
    pub demo_frame: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { name: DEFAULT_NAME.to_string(),
               trace_steps: false,
               demo_frame: Duration::from_millis(DEFAULT_FRAME_MS) }
    }
}

impl PipelineConfig {
    /// Lee la configuración del entorno, cargando `.env` si existe.
    pub fn from_env() -> Result<Self, ConfigError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let name = lookup("PIPELINE_NAME").filter(|v| !v.trim().is_empty())
                                          .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let trace_steps = match lookup("PIPELINE_TRACE_STEPS") {
            Some(v) => parse_bool("PIPELINE_TRACE_STEPS", &v)?,
            None => false,
        };
        let frame_ms = match lookup("PIPELINE_DEMO_FRAME_MS") {
            Some(v) => v.trim().parse::<u64>().map_err(|_| ConfigError::Invalid { key: "PIPELINE_DEMO_FRAME_MS",
                                                                                   value: v.clone() })?,
            None => DEFAULT_FRAME_MS,
        };
        Ok(Self { name,
                  trace_steps,
                  demo_frame: Duration::from_millis(frame_ms) })
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions { name: self.name.clone(),
                        trace_steps: self.trace_steps }
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid { key,
                                        value: value.to_string() }),
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
/// Si el entorno trae valores inválidos se usan los valores por defecto.
pub static CONFIG: Lazy<PipelineConfig> = Lazy::new(|| {
    PipelineConfig::from_env().unwrap_or_else(|e| {
                                  warn!("configuración inválida, usando valores por defecto: {e}");
                                  PipelineConfig::default()
                              })
});

/// Opciones del engine según la configuración global.
pub fn engine_options() -> EngineOptions {
    CONFIG.engine_options()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = PipelineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.engine_options(), EngineOptions::default());
    }

    #[test]
    fn reads_all_keys() {
        let cfg = PipelineConfig::from_lookup(lookup(&[("PIPELINE_NAME", "frames"),
                                                       ("PIPELINE_TRACE_STEPS", "TRUE"),
                                                       ("PIPELINE_DEMO_FRAME_MS", "20")])).unwrap();
        assert_eq!(cfg.name, "frames");
        assert!(cfg.trace_steps);
        assert_eq!(cfg.demo_frame, Duration::from_millis(20));
        assert_eq!(cfg.engine_options().name, "frames");
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = PipelineConfig::from_lookup(lookup(&[("PIPELINE_TRACE_STEPS", "quizás")])).unwrap_err();
        assert_eq!(err,
                   ConfigError::Invalid { key: "PIPELINE_TRACE_STEPS",
                                          value: "quizás".into() });
        assert!(PipelineConfig::from_lookup(lookup(&[("PIPELINE_DEMO_FRAME_MS", "-3")])).is_err());
    }
}
