//! Definiciones relacionadas a Steps.
//!
//! Un Step es una etapa registrada del pipeline: una `Transform` con un id
//! estable y un flag `enabled`. Este módulo define:
//! - `Transform`: interfaz neutra usada por el engine (valor o stream).
//! - `PlainTransform` / `StreamOperator`: adaptadores desde closures.
//! - `AsyncTransform`: interfaz async de alto nivel (opcional).
//! - `Step` y `StepId`.

pub mod adapters;
pub mod definition;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use adapters::{AsyncTransform, PlainTransform, StreamOperator};
pub use definition::{last_value, single, Applied, BoxError, Operand, SharedTransform, Transform, ValueStream};

/// Identificador de un step. Se asigna de forma monótona al registrar y no
/// se reutiliza nunca dentro de un mismo registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StepId(u64);

impl StepId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Etapa registrada. Inmutable: habilitar/deshabilitar produce un `Step`
/// nuevo con el mismo id.
pub struct Step<T> {
    id: StepId,
    transform: SharedTransform<T>,
    enabled: bool,
}

impl<T> Step<T> {
    pub fn new(id: StepId, transform: SharedTransform<T>, enabled: bool) -> Self {
        Self { id,
               transform,
               enabled }
    }

    pub fn id(&self) -> StepId {
        self.id
    }

    pub fn transform(&self) -> &SharedTransform<T> {
        &self.transform
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Copia del step con otro valor de `enabled`.
    pub fn with_enabled(&self, enabled: bool) -> Self {
        Self { id: self.id,
               transform: Arc::clone(&self.transform),
               enabled }
    }

    /// Compara por identidad de la transformación (mismo `Arc`), ignorando
    /// la vtable.
    pub fn holds(&self, transform: &SharedTransform<T>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.transform), Arc::as_ptr(transform))
    }
}

impl<T> fmt::Debug for Step<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
         .field("id", &self.id)
         .field("label", &self.transform.label())
         .field("enabled", &self.enabled)
         .finish()
    }
}
