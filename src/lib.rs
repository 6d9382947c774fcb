//! Operator Pipeline
//!
//! Este crate reúne el motor y los operadores del pipeline:
//! - Expone `config` para leer las opciones del entorno.
//! - Expone `errors` para los errores de configuración.
//! - Re-exporta `pipeline_core` (como `engine`) y `pipeline_operators`.
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod config;
pub mod errors;

pub use pipeline_core as engine;
pub use pipeline_operators as operators;

pub use config::{engine_options, PipelineConfig, CONFIG};
pub use errors::ConfigError;

use pipeline_core::{BoxError, OperatorPipeline};

/// Pipeline vacío con las opciones de la configuración global.
pub fn configured_pipeline<T>() -> OperatorPipeline<T>
    where T: Clone + Send + 'static
{
    OperatorPipeline::with_options(engine_options())
}

/// Lanza una llamada a `process_updates` por valor, cada una en su propia
/// tarea, y devuelve los resultados en el orden de `inputs`.
///
/// Un step fallido o una tarea que entra en pánico se propagan como error.
pub async fn process_concurrently<T, I>(pipeline: &OperatorPipeline<T>, inputs: I) -> Result<Vec<T>, BoxError>
    where T: Clone + Send + 'static,
          I: IntoIterator<Item = T>
{
    let calls: Vec<_> = inputs.into_iter()
                              .map(|input| {
                                  let pipeline = pipeline.clone();
                                  tokio::spawn(async move { pipeline.process_updates(input).await })
                              })
                              .collect();
    let mut results = Vec::with_capacity(calls.len());
    for call in calls {
        results.push(call.await??);
    }
    Ok(results)
}
