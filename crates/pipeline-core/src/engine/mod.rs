//! Engine module for OperatorPipeline implementation
//!
//! Provides the pipeline engine and the options it consumes.

pub mod core;

pub use core::OperatorPipeline;

/// Opciones del engine. La capa de configuración de la aplicación las
/// construye a partir del entorno.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Etiqueta usada en los logs.
    pub name: String,
    /// Loguea la clasificación de cada step en nivel debug.
    pub trace_steps: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { name: "operator-pipeline".to_string(),
               trace_steps: false }
    }
}
