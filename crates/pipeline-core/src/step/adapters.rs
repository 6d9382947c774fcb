//! Adaptadores desde closures a la interfaz neutra `Transform`.
//!
//! `PlainTransform` sólo acepta valores planos y `StreamOperator` sólo acepta
//! streams; cada uno rechaza el otro operando con `OperandMismatch`, que es
//! justamente la señal que usa el sondeo de capacidades.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::definition::{Applied, BoxError, Operand, SharedTransform, Transform, ValueStream};
use crate::errors::OperandMismatch;

type PlainFn<T> = dyn Fn(T) -> Result<Applied<T>, BoxError> + Send + Sync;
type OperatorFn<T> = dyn Fn(ValueStream<T>) -> ValueStream<T> + Send + Sync;

/// Interfaz async de alto nivel para transformaciones planas con estado.
///
/// Devolver `Ok(None)` deja el valor actual del pipeline intacto.
#[async_trait]
pub trait AsyncTransform<T: Send + 'static>: Send + Sync {
    async fn transform(&self, value: T) -> Result<Option<T>, BoxError>;
}

/// Transformación plana: `T -> T | future<T>`.
pub struct PlainTransform<T> {
    label: Cow<'static, str>,
    call: Box<PlainFn<T>>,
}

impl<T: Send + 'static> PlainTransform<T> {
    fn from_fn<F>(call: F) -> Self
        where F: Fn(T) -> Result<Applied<T>, BoxError> + Send + Sync + 'static
    {
        Self { label: Cow::Borrowed("plain"),
               call: Box::new(call) }
    }

    /// Función síncrona infalible.
    pub fn sync<F>(f: F) -> Self
        where F: Fn(T) -> T + Send + Sync + 'static
    {
        Self::from_fn(move |value| Ok(Applied::Ready(Some(f(value)))))
    }

    /// Función síncrona que puede no producir resultado.
    pub fn optional<F>(f: F) -> Self
        where F: Fn(T) -> Option<T> + Send + Sync + 'static
    {
        Self::from_fn(move |value| Ok(Applied::Ready(f(value))))
    }

    /// Función síncrona que puede fallar.
    pub fn fallible<F, E>(f: F) -> Self
        where F: Fn(T) -> Result<T, E> + Send + Sync + 'static,
              E: Into<BoxError>
    {
        Self::from_fn(move |value| f(value).map(|v| Applied::Ready(Some(v))).map_err(Into::into))
    }

    /// Función que devuelve un future.
    pub fn future<F, Fut, E>(f: F) -> Self
        where F: Fn(T) -> Fut + Send + Sync + 'static,
              Fut: Future<Output = Result<T, E>> + Send + 'static,
              E: Into<BoxError>
    {
        Self::from_fn(move |value| {
            let fut = f(value);
            Ok(Applied::Pending(Box::pin(async move { fut.await.map(Some).map_err(Into::<BoxError>::into) })))
        })
    }

    /// Adapta una implementación de `AsyncTransform`.
    pub fn from_async<A>(inner: A) -> Self
        where A: AsyncTransform<T> + 'static
    {
        let inner = Arc::new(inner);
        Self::from_fn(move |value| {
            let inner = Arc::clone(&inner);
            Ok(Applied::Pending(Box::pin(async move { inner.transform(value).await })))
        })
    }

    pub fn named(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    pub fn shared(self) -> SharedTransform<T> {
        Arc::new(self)
    }
}

impl<T: Send + 'static> Transform<T> for PlainTransform<T> {
    fn apply(&self, operand: Operand<T>) -> Result<Applied<T>, BoxError> {
        match operand {
            Operand::Value(value) => (self.call)(value),
            Operand::Stream(_) => Err(Box::new(OperandMismatch::ExpectedValue(self.label.to_string()))),
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Operador de stream: `stream<T> -> stream<T>`.
pub struct StreamOperator<T> {
    label: Cow<'static, str>,
    op: Box<OperatorFn<T>>,
}

impl<T: Send + 'static> StreamOperator<T> {
    pub fn new<F>(op: F) -> Self
        where F: Fn(ValueStream<T>) -> ValueStream<T> + Send + Sync + 'static
    {
        Self { label: Cow::Borrowed("operator"),
               op: Box::new(op) }
    }

    pub fn named(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    pub fn shared(self) -> SharedTransform<T> {
        Arc::new(self)
    }

    /// Aplica el operador directamente a un stream, sin pasar por el engine.
    /// Útil para consumir todas las emisiones intermedias.
    pub fn pipe(&self, input: ValueStream<T>) -> ValueStream<T> {
        (self.op)(input)
    }
}

impl<T: Send + 'static> Transform<T> for StreamOperator<T> {
    fn apply(&self, operand: Operand<T>) -> Result<Applied<T>, BoxError> {
        match operand {
            Operand::Stream(input) => Ok(Applied::Stream((self.op)(input))),
            Operand::Value(_) => Err(Box::new(OperandMismatch::ExpectedStream(self.label.to_string()))),
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}
