//! Registro de steps con publicación copy-on-write.
//!
//! El estado vigente es un `Arc<Snapshot<T>>` guardado en un `ArcSwap`:
//! - los lectores (`current`) nunca bloquean y conservan el snapshot que
//!   capturaron aunque el registro cambie después;
//! - cada mutación construye un snapshot nuevo y lo publica con `rcu`;
//! - quitar o alternar un id inexistente no es un error, simplemente no
//!   publica nada.
//!
//! Los ids salen de un contador propio de cada instancia y no se reutilizan.

mod handle;
mod snapshot;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use log::debug;

use crate::step::{SharedTransform, Step, StepId};

pub use handle::OperatorHandle;
pub use snapshot::{Snapshot, StepInfo};

pub struct StepRegistry<T> {
    current: ArcSwap<Snapshot<T>>,
    next_id: AtomicU64,
}

impl<T> StepRegistry<T> {
    pub fn new() -> Self {
        Self { current: ArcSwap::from_pointee(Snapshot::empty()),
               next_id: AtomicU64::new(0) }
    }

    /// Último snapshot publicado. No bloquea.
    pub fn current(&self) -> Arc<Snapshot<T>> {
        self.current.load_full()
    }

    /// Añade un step al final y devuelve su id.
    pub fn insert(&self, transform: SharedTransform<T>, enabled: bool) -> StepId {
        let id = StepId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let step = Arc::new(Step::new(id, transform, enabled));
        self.current.rcu(|cur| {
                        let mut steps = cur.steps().to_vec();
                        steps.push(Arc::clone(&step));
                        Snapshot::from_steps(steps)
                    });
        debug!("step {id} registered (enabled={enabled})");
        id
    }

    /// Añade un step y devuelve un handle ligado a su id.
    pub fn add(self: &Arc<Self>, transform: SharedTransform<T>, enabled: bool) -> OperatorHandle<T> {
        let id = self.insert(transform, enabled);
        OperatorHandle::new(id, Arc::downgrade(self))
    }

    /// Fija `enabled` si `new_state` es `Some`, o lo invierte si es `None`.
    /// Devuelve `false` si el id no existe.
    pub fn toggle(&self, id: StepId, new_state: Option<bool>) -> bool {
        self.update(|cur| {
                if cur.get(id).is_none() {
                    return None;
                }
                let steps = cur.steps()
                               .iter()
                               .map(|s| {
                                   if s.id() == id {
                                       Arc::new(s.with_enabled(new_state.unwrap_or(!s.is_enabled())))
                                   } else {
                                       Arc::clone(s)
                                   }
                               })
                               .collect();
                Some(Snapshot::from_steps(steps))
            })
    }

    /// Quita el step con ese id. Devuelve `false` si no existía.
    pub fn remove_by_id(&self, id: StepId) -> bool {
        let removed = self.remove_where(|s| s.id() == id) > 0;
        if removed {
            debug!("step {id} removed");
        }
        removed
    }

    /// Quita todos los steps que usan exactamente esa transformación (mismo
    /// `Arc`). Devuelve cuántos se quitaron.
    pub fn remove_by_transform(&self, transform: &SharedTransform<T>) -> usize {
        let removed = self.remove_where(|s| s.holds(transform));
        if removed > 0 {
            debug!("{removed} step(s) removed by transform reference");
        }
        removed
    }

    fn remove_where<P>(&self, predicate: P) -> usize
        where P: Fn(&Arc<Step<T>>) -> bool
    {
        let mut removed = 0;
        self.update(|cur| {
                let steps: Vec<_> = cur.steps().iter().filter(|&s| !predicate(s)).cloned().collect();
                removed = cur.len() - steps.len();
                (removed > 0).then(|| Snapshot::from_steps(steps))
            });
        removed
    }

    /// Publica el snapshot que devuelva `f`, o deja el actual si devuelve
    /// `None`. Puede reintentar `f` si otro escritor publica en medio.
    fn update<F>(&self, mut f: F) -> bool
        where F: FnMut(&Snapshot<T>) -> Option<Snapshot<T>>
    {
        let mut changed = false;
        self.current.rcu(|cur| match f(&**cur) {
                        Some(next) => {
                            changed = true;
                            Arc::new(next)
                        }
                        None => {
                            changed = false;
                            Arc::clone(cur)
                        }
                    });
        changed
    }
}

impl<T> Default for StepRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::PlainTransform;

    fn add_one() -> SharedTransform<i32> {
        PlainTransform::sync(|v: i32| v + 1).shared()
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let registry = StepRegistry::new();
        let a = registry.insert(add_one(), true);
        let b = registry.insert(add_one(), true);
        assert!(registry.remove_by_id(b));
        let c = registry.insert(add_one(), true);
        assert_eq!(a, StepId::new(0));
        assert_eq!(b, StepId::new(1));
        assert_eq!(c, StepId::new(2));
        let ids: Vec<_> = registry.current().steps().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn captured_snapshot_is_not_a_live_view() {
        let registry = StepRegistry::new();
        let a = registry.insert(add_one(), true);
        let before = registry.current();
        registry.toggle(a, Some(false));
        registry.insert(add_one(), true);
        assert_eq!(before.describe(), vec![StepInfo { id: a, enabled: true }]);
        assert_eq!(registry.current().len(), 2);
        assert!(!registry.current().get(a).unwrap().is_enabled());
    }

    #[test]
    fn toggle_flips_or_sets_and_shares_untouched_steps() {
        let registry = StepRegistry::new();
        let a = registry.insert(add_one(), true);
        let b = registry.insert(add_one(), true);
        let before = registry.current();

        assert!(registry.toggle(a, None));
        let after = registry.current();
        assert!(!after.get(a).unwrap().is_enabled());
        assert!(Arc::ptr_eq(before.get(b).unwrap(), after.get(b).unwrap()));

        registry.toggle(a, None);
        assert!(registry.current().get(a).unwrap().is_enabled());
        registry.toggle(a, Some(true));
        assert!(registry.current().get(a).unwrap().is_enabled());
    }

    #[test]
    fn missing_targets_are_silent_noops() {
        let registry = StepRegistry::new();
        registry.insert(add_one(), true);
        let before = registry.current();
        assert!(!registry.toggle(StepId::new(99), Some(false)));
        assert!(!registry.remove_by_id(StepId::new(99)));
        assert_eq!(registry.remove_by_transform(&add_one()), 0);
        assert!(Arc::ptr_eq(&before, &registry.current()));
    }

    #[test]
    fn remove_by_transform_uses_reference_identity() {
        let registry = StepRegistry::new();
        let shared = add_one();
        let lookalike = add_one();
        registry.insert(Arc::clone(&shared), true);
        registry.insert(lookalike, true);
        registry.insert(Arc::clone(&shared), false);
        assert_eq!(registry.remove_by_transform(&shared), 2);
        assert_eq!(registry.current().len(), 1);
    }
}
