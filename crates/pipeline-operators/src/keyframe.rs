//! Operador `keyframe`: efectos laterales retardados sobre cada valor.
//!
//! Por cada valor de entrada se encadenan pares (espera, efecto) en orden;
//! cada espera cuenta desde que terminó el par anterior. El valor se reenvía
//! sin cambios cuando termina la cadena.
//!
//! - Modo secuencial (por defecto): las cadenas de distintos valores se
//!   ejecutan de a una, en orden de llegada. La cola es del operador, así
//!   que también ordena llamadas independientes que compartan el operador.
//! - Modo concurrente: cada cadena arranca al llegar su valor.
//!
//! Cada invocación tiene su propio `CancellationToken`, hijo del token del
//! operador. Se dispara al terminar la cadena (bien, con error o porque el
//! consumidor soltó el stream) y una cadena cancelada termina sin emitir.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future;
use futures_util::stream::{self, StreamExt};
use log::trace;
use pipeline_core::{BoxError, StreamOperator, ValueStream};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

type Effect<T> = dyn Fn(&T) -> Result<(), BoxError> + Send + Sync;

/// Esperas de un keyframe: una sola o una secuencia ordenada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delays {
    Single(Duration),
    Sequence(Vec<Duration>),
}

impl Delays {
    pub fn as_slice(&self) -> &[Duration] {
        match self {
            Delays::Single(d) => std::slice::from_ref(d),
            Delays::Sequence(ds) => ds,
        }
    }

    /// Tiempo total de una cadena completa.
    pub fn total(&self) -> Duration {
        self.as_slice().iter().sum()
    }
}

impl From<Duration> for Delays {
    fn from(d: Duration) -> Self {
        Delays::Single(d)
    }
}

impl From<Vec<Duration>> for Delays {
    fn from(ds: Vec<Duration>) -> Self {
        Delays::Sequence(ds)
    }
}

impl From<&[Duration]> for Delays {
    fn from(ds: &[Duration]) -> Self {
        Delays::Sequence(ds.to_vec())
    }
}

impl<const N: usize> From<[Duration; N]> for Delays {
    fn from(ds: [Duration; N]) -> Self {
        Delays::Sequence(ds.to_vec())
    }
}

/// Builder del operador keyframe.
pub struct Keyframe<T> {
    delays: Delays,
    effect: Arc<Effect<T>>,
    concurrent: bool,
    cancel: CancellationToken,
}

impl<T: Send + 'static> Keyframe<T> {
    /// Keyframe con efecto que puede fallar. Un error del efecto es el
    /// error del operador.
    pub fn new<F, E>(delays: impl Into<Delays>, effect: F) -> Self
        where F: Fn(&T) -> Result<(), E> + Send + Sync + 'static,
              E: Into<BoxError>
    {
        Self { delays: delays.into(),
               effect: Arc::new(move |value: &T| effect(value).map_err(Into::<BoxError>::into)),
               concurrent: false,
               cancel: CancellationToken::new() }
    }

    pub fn concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Token padre: cancelarlo corta todas las cadenas en curso y las
    /// futuras de este operador.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn into_operator(self) -> StreamOperator<T> {
        let concurrent = self.concurrent;
        let shared = Arc::new(Shared { delays: self.delays,
                                       effect: self.effect,
                                       cancel: self.cancel,
                                       queue: Arc::new(Mutex::new(())) });
        StreamOperator::new(move |input: ValueStream<T>| {
            let shared = Arc::clone(&shared);
            if concurrent {
                input.flat_map_unordered(None::<usize>, move |item| shared.invoke(item, false))
                     .boxed()
            } else {
                input.flat_map(move |item| shared.invoke(item, true)).boxed()
            }
        }).named("keyframe")
    }
}

struct Shared<T> {
    delays: Delays,
    effect: Arc<Effect<T>>,
    cancel: CancellationToken,
    queue: Arc<Mutex<()>>,
}

impl<T: Send + 'static> Shared<T> {
    fn invoke(&self, item: Result<T, BoxError>, queued: bool) -> ValueStream<T> {
        let value = match item {
            Ok(value) => value,
            Err(e) => return stream::iter(Some(Err(e))).boxed(),
        };
        let ctx = InvocationContext { cancel: self.cancel.child_token(),
                                      pending: self.delays.as_slice().iter().copied().collect(),
                                      effect: Arc::clone(&self.effect),
                                      queue: queued.then(|| Arc::clone(&self.queue)) };
        stream::once(ctx.run(value)).filter_map(future::ready).boxed()
    }
}

/// Estado efímero de una invocación: señal de cancelación y pares
/// pendientes.
struct InvocationContext<T> {
    cancel: CancellationToken,
    pending: VecDeque<Duration>,
    effect: Arc<Effect<T>>,
    queue: Option<Arc<Mutex<()>>>,
}

impl<T> InvocationContext<T> {
    async fn run(mut self, value: T) -> Option<Result<T, BoxError>> {
        let _teardown = self.cancel.clone().drop_guard();

        let _turn = match &self.queue {
            Some(queue) => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return None,
                turn = queue.lock() => Some(turn),
            },
            None => None,
        };

        while let Some(delay) = self.pending.pop_front() {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    trace!("keyframe chain cancelled with {} pair(s) left", self.pending.len() + 1);
                    return None;
                }
                _ = sleep(delay) => {}
            }
            if let Err(e) = (self.effect)(&value) {
                return Some(Err(e));
            }
            trace!("keyframe side effect fired after {delay:?}");
        }
        Some(Ok(value))
    }
}

/// `keyframe(delays, effect, concurrent)` con un efecto infalible.
pub fn keyframe<T, F>(delays: impl Into<Delays>, effect: F, concurrent: bool) -> StreamOperator<T>
    where T: Send + 'static,
          F: Fn(&T) + Send + Sync + 'static
{
    Keyframe::new(delays, move |value: &T| {
        effect(value);
        Ok::<(), Infallible>(())
    }).concurrent(concurrent)
      .into_operator()
}

/// Igual que `keyframe`, pero el efecto puede fallar.
pub fn try_keyframe<T, F, E>(delays: impl Into<Delays>, effect: F, concurrent: bool) -> StreamOperator<T>
    where T: Send + 'static,
          F: Fn(&T) -> Result<(), E> + Send + Sync + 'static,
          E: Into<BoxError>
{
    Keyframe::new(delays, effect).concurrent(concurrent).into_operator()
}
