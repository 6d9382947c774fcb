//! Errores del core del pipeline.

use thiserror::Error;

use crate::step::{BoxError, StepId};

/// Error que aborta una llamada a `process_updates`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Un step lanzó un error o su future/stream fue rechazado durante la
    /// ejecución del pipeline. Envuelve el error original.
    #[error("operator execution failed during pipeline execution (step {step_id} `{label}`): {source}")]
    OperatorExecution {
        step_id: StepId,
        label: String,
        #[source]
        source: BoxError,
    },
}

impl PipelineError {
    /// Step donde se originó el fallo.
    pub fn step_id(&self) -> StepId {
        match self {
            PipelineError::OperatorExecution { step_id, .. } => *step_id,
        }
    }
}

/// Lo devuelve un adaptador cuando recibe un operando del tipo equivocado.
/// Durante el sondeo de capacidades se interpreta como señal, no como fallo.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperandMismatch {
    #[error("`{0}` expects a plain value, got a stream")]
    ExpectedValue(String),
    #[error("`{0}` expects a stream, got a plain value")]
    ExpectedStream(String),
}
