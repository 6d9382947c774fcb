//! Operador `tween`: interpolación numérica en pasos fijos.
//!
//! Cada valor que llega dispara una secuencia de `TWEEN_STEPS` emisiones; el
//! contenido del valor de entrada no importa. El paso `i` (1..=10) se emite a
//! `i * duration / 10` desde el inicio de la invocación, con valor
//! `start + easing(i / 10) * (end - start)`. Las esperas se miden contra el
//! instante de inicio, no contra la emisión anterior, así que no acumulan
//! deriva.
//!
//! Usado como step del engine sólo sobrevive la última emisión (el valor
//! final); para ver los pasos intermedios hay que consumir el stream
//! directamente con `Tween::play` o `StreamOperator::pipe`.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use log::debug;
use pipeline_core::{BoxError, StreamOperator, ValueStream};
use tokio::time::{sleep_until, Instant};

use crate::easing;

/// Número fijo de pasos por invocación.
pub const TWEEN_STEPS: u32 = 10;

type Easing = dyn Fn(f64) -> f64 + Send + Sync;
type Hook = dyn Fn() + Send + Sync;

/// Valores que saben interpolarse linealmente.
pub trait Interpolate: Clone + Send + Sync + 'static {
    fn interpolate(start: &Self, end: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(start: &Self, end: &Self, t: f64) -> Self {
        start + t * (end - start)
    }
}

impl Interpolate for f32 {
    fn interpolate(start: &Self, end: &Self, t: f64) -> Self {
        start + (t as f32) * (end - start)
    }
}

/// Descriptor de un tween. No guarda estado entre invocaciones: el
/// calendario se recalcula en cada una.
#[derive(Clone)]
pub struct Tween<V> {
    duration: Duration,
    start: V,
    end: V,
    easing: Arc<Easing>,
    on_complete: Arc<Hook>,
}

impl<V: Interpolate> Tween<V> {
    pub fn new(duration: Duration, start: V, end: V) -> Self {
        Self { duration,
               start,
               end,
               easing: Arc::new(easing::linear),
               on_complete: Arc::new(|| debug!("tween complete")) }
    }

    /// Función de easing `[0,1] -> [0,1]`.
    pub fn easing<F>(mut self, f: F) -> Self
        where F: Fn(f64) -> f64 + Send + Sync + 'static
    {
        self.easing = Arc::new(f);
        self
    }

    /// Hook de finalización. Corre una vez por invocación al terminar el
    /// stream, también si el consumidor lo suelta antes.
    pub fn on_complete<F>(mut self, f: F) -> Self
        where F: Fn() + Send + Sync + 'static
    {
        self.on_complete = Arc::new(f);
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Calendario de una invocación: (desplazamiento desde el inicio, valor).
    pub fn frames(&self) -> Vec<(Duration, V)> {
        let step = self.duration / TWEEN_STEPS;
        (1..=TWEEN_STEPS).map(|i| {
                             let progress = (self.easing)(f64::from(i) / f64::from(TWEEN_STEPS));
                             (step * i, V::interpolate(&self.start, &self.end, progress))
                         })
                         .collect()
    }

    /// Stream de una invocación. El reloj empieza en el primer poll.
    pub fn play(&self) -> ValueStream<V> {
        let frames = self.frames().into_iter();
        let finalize = Finalize(Arc::clone(&self.on_complete));
        stream::unfold((frames, None::<Instant>, finalize), |(mut frames, started, finalize)| async move {
            let started = started.unwrap_or_else(Instant::now);
            let (offset, value) = frames.next()?;
            sleep_until(started + offset).await;
            Some((Ok::<V, BoxError>(value), (frames, Some(started), finalize)))
        }).boxed()
    }

    /// Convierte el tween en operador: cada valor de entrada dispara una
    /// invocación, en orden y sin solaparse.
    pub fn into_operator(self) -> StreamOperator<V> {
        let tween = Arc::new(self);
        StreamOperator::new(move |input: ValueStream<V>| {
            let tween = Arc::clone(&tween);
            input.flat_map(move |item| match item {
                     Ok(_) => tween.play(),
                     Err(e) => stream::iter(Some(Err(e))).boxed(),
                 })
                 .boxed()
        }).named("tween")
    }
}

/// Ejecuta el hook al soltarse (fin del stream o abandono del consumidor).
struct Finalize(Arc<Hook>);

impl Drop for Finalize {
    fn drop(&mut self) {
        (self.0)();
    }
}

/// `tween(duration, start, end)` con easing lineal. Para otra curva, ver
/// `tween_with` o el builder `Tween::easing`.
pub fn tween<V: Interpolate>(duration: Duration, start: V, end: V) -> StreamOperator<V> {
    Tween::new(duration, start, end).into_operator()
}

/// `tween` con función de easing explícita.
pub fn tween_with<V, F>(duration: Duration, start: V, end: V, easing: F) -> StreamOperator<V>
    where V: Interpolate,
          F: Fn(f64) -> f64 + Send + Sync + 'static
{
    Tween::new(duration, start, end).easing(easing).into_operator()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_core::single;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn frames_are_evenly_spaced_and_linear() {
        let frames = Tween::new(Duration::from_millis(500), 0.0f64, 100.0).frames();
        assert_eq!(frames.len(), 10);
        assert_eq!(frames[0].0, Duration::from_millis(50));
        assert!((frames[0].1 - 10.0).abs() < 1e-9);
        assert_eq!(frames[9].0, Duration::from_millis(500));
        assert!((frames[9].1 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn easing_shapes_progress() {
        let frames = Tween::new(Duration::from_millis(100), 0.0f32, 1.0).easing(easing::ease_in)
                                                                       .frames();
        assert!((frames[4].1 - 0.25).abs() < 1e-6);
        assert!((frames[9].1 - 1.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn tween_with_applies_easing() {
        let op = tween_with(Duration::from_millis(100), 0.0, 1.0, easing::ease_in);
        let values: Vec<f64> = op.pipe(single(0.0)).map(|r| r.unwrap()).collect().await;
        assert!((values[4] - 0.25).abs() < 1e-9);
        assert!((values[9] - 1.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn finalize_runs_once_per_invocation() {
        let done = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&done);
        let op = Tween::new(Duration::from_millis(100), 0.0, 1.0).on_complete(move || {
                                                                      counter.fetch_add(1, Ordering::SeqCst);
                                                                  })
                                                                  .into_operator();
        let values: Vec<f64> = op.pipe(single(0.0)).map(|r| r.unwrap()).collect().await;
        assert_eq!(values.len(), 10);
        assert_eq!(done.load(Ordering::SeqCst), 1);

        // abandonar el stream a mitad también finaliza
        let mut partial = op.pipe(single(0.0));
        partial.next().await;
        drop(partial);
        assert_eq!(done.load(Ordering::SeqCst), 2);
    }
}
