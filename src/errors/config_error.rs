use thiserror::Error;

/// Errores al leer la configuración del entorno.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Valor inválido para {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
