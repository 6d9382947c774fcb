//! Core OperatorPipeline implementation

use std::sync::Arc;

use log::{debug, log, trace, warn, Level};

use super::EngineOptions;
use crate::errors::PipelineError;
use crate::probe::{classify, OperatorKind};
use crate::registry::{OperatorHandle, Snapshot, StepRegistry};
use crate::step::{single, BoxError, Operand, SharedTransform, Step, Transform};

/// Pipeline de operadores reconfigurable en caliente.
///
/// Mantiene un `StepRegistry` y aplica sus steps habilitados, en orden, a
/// cada valor que recibe `process_updates`. Clonar el pipeline comparte el
/// mismo registro, lo que permite lanzar llamadas concurrentes desde varias
/// tareas.
pub struct OperatorPipeline<T> {
    registry: Arc<StepRegistry<T>>,
    options: Arc<EngineOptions>,
}

impl<T> OperatorPipeline<T>
    where T: Clone + Send + 'static
{
    /// Crea un pipeline vacío con opciones por defecto
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self { registry: Arc::new(StepRegistry::new()),
               options: Arc::new(options) }
    }

    /// Crea un pipeline con operadores iniciales, todos habilitados.
    pub fn with_operators<I>(initial: I) -> Self
        where I: IntoIterator<Item = SharedTransform<T>>
    {
        let pipeline = Self::new();
        for transform in initial {
            pipeline.registry.insert(transform, true);
        }
        pipeline
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn registry(&self) -> &Arc<StepRegistry<T>> {
        &self.registry
    }

    /// Snapshot vigente del registro
    pub fn snapshot(&self) -> Arc<Snapshot<T>> {
        self.registry.current()
    }

    /// Registra un operador al final del pipeline.
    pub fn add_operator(&self, transform: SharedTransform<T>, enabled: bool) -> OperatorHandle<T> {
        self.registry.add(transform, enabled)
    }

    /// Atajo para registrar un operador habilitado sin conservar su `Arc`.
    pub fn add<X>(&self, transform: X) -> OperatorHandle<T>
        where X: Transform<T> + 'static
    {
        self.add_operator(Arc::new(transform), true)
    }

    /// Quita todos los steps registrados con esa misma transformación.
    pub fn remove_operator(&self, transform: &SharedTransform<T>) -> usize {
        self.registry.remove_by_transform(transform)
    }

    /// Aplica los steps habilitados a `input` y devuelve el valor final.
    ///
    /// El snapshot se captura una única vez al empezar: cambios posteriores
    /// en el registro sólo afectan a llamadas que empiecen después. El primer
    /// step que falle aborta la llamada completa.
    pub async fn process_updates(&self, input: T) -> Result<T, PipelineError> {
        let snapshot = self.registry.current();
        let enabled: Vec<&Arc<Step<T>>> = snapshot.enabled().collect();
        debug!("[{}] processing update through {}/{} enabled steps",
               self.options.name,
               enabled.len(),
               snapshot.len());

        let mut current = input;
        for step in enabled {
            let transform = step.transform();
            let kind = classify(transform.as_ref(), &current);
            // `trace_steps` sube la clasificación de trace a debug
            let level = if self.options.trace_steps { Level::Debug } else { Level::Trace };
            log!(level,
                 "[{}] step {} `{}` classified as {:?}",
                 self.options.name,
                 step.id(),
                 transform.label(),
                 kind);

            let operand = match kind {
                OperatorKind::StreamOperator => Operand::Stream(single(current.clone())),
                OperatorKind::PlainTransform => Operand::Value(current.clone()),
            };
            let applied = transform.apply(operand).map_err(|e| self.failure(step, e))?;
            match applied.resolve().await.map_err(|e| self.failure(step, e))? {
                Some(next) => current = next,
                None => trace!("[{}] step {} produced no value, keeping the previous one",
                               self.options.name,
                               step.id()),
            }
        }

        Ok(current)
    }

    fn failure(&self, step: &Step<T>, source: BoxError) -> PipelineError {
        warn!("[{}] step {} `{}` failed: {source}",
              self.options.name,
              step.id(),
              step.transform().label());
        PipelineError::OperatorExecution { step_id: step.id(),
                                           label: step.transform().label().to_string(),
                                           source }
    }
}

impl<T> Clone for OperatorPipeline<T> {
    fn clone(&self) -> Self {
        Self { registry: Arc::clone(&self.registry),
               options: Arc::clone(&self.options) }
    }
}

impl<T> Default for OperatorPipeline<T>
    where T: Clone + Send + 'static
{
    fn default() -> Self {
        Self::new()
    }
}
