use std::sync::Weak;

use super::StepRegistry;
use crate::step::StepId;

/// Handle devuelto al registrar un operador. Está ligado al id del step,
/// no a su posición, y no mantiene vivo el registro: si el pipeline ya no
/// existe, sus operaciones no hacen nada.
pub struct OperatorHandle<T> {
    id: StepId,
    registry: Weak<StepRegistry<T>>,
}

impl<T> OperatorHandle<T> {
    pub(crate) fn new(id: StepId, registry: Weak<StepRegistry<T>>) -> Self {
        Self { id, registry }
    }

    pub fn id(&self) -> StepId {
        self.id
    }

    /// `Some(true)` habilita, `Some(false)` deshabilita, `None` invierte.
    pub fn toggle(&self, new_state: Option<bool>) {
        if let Some(registry) = self.registry.upgrade() {
            registry.toggle(self.id, new_state);
        }
    }

    /// Quita el step del pipeline. Llamadas repetidas no tienen efecto.
    pub fn remove(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove_by_id(self.id);
        }
    }

    /// Estado actual del step, o `None` si ya fue quitado.
    pub fn is_enabled(&self) -> Option<bool> {
        let registry = self.registry.upgrade()?;
        let snapshot = registry.current();
        snapshot.get(self.id).map(|s| s.is_enabled())
    }
}

impl<T> Clone for OperatorHandle<T> {
    fn clone(&self) -> Self {
        Self { id: self.id,
               registry: Weak::clone(&self.registry) }
    }
}

impl<T> std::fmt::Debug for OperatorHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorHandle").field("id", &self.id).finish()
    }
}
