use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::step::{Step, StepId};

/// Vista serializable de un step, para diagnóstico.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    pub id: StepId,
    pub enabled: bool,
}

/// Secuencia inmutable y ordenada de steps (orden de inserción = orden de
/// aplicación). Nunca se muta: cada cambio en el registro publica un
/// snapshot nuevo que comparte los `Step` no modificados.
pub struct Snapshot<T> {
    steps: Vec<Arc<Step<T>>>,
}

impl<T> Snapshot<T> {
    pub fn empty() -> Self {
        Self { steps: Vec::new() }
    }

    pub(crate) fn from_steps(steps: Vec<Arc<Step<T>>>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Arc<Step<T>>] {
        &self.steps
    }

    /// Steps habilitados, en el orden del snapshot.
    pub fn enabled(&self) -> impl Iterator<Item = &Arc<Step<T>>> {
        self.steps.iter().filter(|s| s.is_enabled())
    }

    pub fn get(&self, id: StepId) -> Option<&Arc<Step<T>>> {
        self.steps.iter().find(|s| s.id() == id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn describe(&self) -> Vec<StepInfo> {
        self.steps
            .iter()
            .map(|s| StepInfo { id: s.id(),
                                enabled: s.is_enabled() })
            .collect()
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> std::fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.steps.iter()).finish()
    }
}
