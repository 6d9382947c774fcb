use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::stream::{self, BoxStream, StreamExt};

/// Error opaco producido por una transformación de usuario.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Stream de valores usado por los operadores. Un item `Err` equivale a un
/// rechazo del stream.
pub type ValueStream<T> = BoxStream<'static, Result<T, BoxError>>;

/// Referencia compartida a una transformación registrada.
pub type SharedTransform<T> = Arc<dyn Transform<T>>;

/// Lo que recibe una transformación: un valor plano o un stream de valores.
pub enum Operand<T> {
    Value(T),
    Stream(ValueStream<T>),
}

/// Resultado de aplicar una transformación.
///
/// `None` representa un resultado ausente: el engine conserva el último
/// valor válido en lugar de sobreescribirlo.
pub enum Applied<T> {
    /// Valor disponible de forma síncrona.
    Ready(Option<T>),
    /// Valor que se resolverá más adelante.
    Pending(BoxFuture<'static, Result<Option<T>, BoxError>>),
    /// Stream; sólo su última emisión cuenta para el engine.
    Stream(ValueStream<T>),
}

impl<T> Applied<T> {
    /// Indica si el resultado expone capacidad de stream.
    pub fn is_stream(&self) -> bool {
        matches!(self, Applied::Stream(_))
    }

    /// Normaliza cualquier variante a un valor plano opcional.
    pub async fn resolve(self) -> Result<Option<T>, BoxError> {
        match self {
            Applied::Ready(value) => Ok(value),
            Applied::Pending(fut) => fut.await,
            Applied::Stream(values) => last_value(values).await,
        }
    }
}

impl<T> fmt::Debug for Operand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value(_) => f.write_str("Operand::Value"),
            Operand::Stream(_) => f.write_str("Operand::Stream"),
        }
    }
}

impl<T> fmt::Debug for Applied<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Applied::Ready(v) => write!(f, "Applied::Ready(present={})", v.is_some()),
            Applied::Pending(_) => f.write_str("Applied::Pending"),
            Applied::Stream(_) => f.write_str("Applied::Stream"),
        }
    }
}

/// Trait que define una etapa del pipeline.
///
/// Una implementación puede comportarse como transformación plana (acepta
/// `Operand::Value`) o como operador de stream (acepta `Operand::Stream` y
/// devuelve `Applied::Stream`). El engine decide cuál es mediante
/// `probe::classify`, nunca a partir del tipo concreto.
pub trait Transform<T>: Send + Sync {
    /// Aplica la transformación. Devolver `Err` equivale a lanzar un error
    /// síncrono.
    fn apply(&self, operand: Operand<T>) -> Result<Applied<T>, BoxError>;

    /// Nombre amigable para logs.
    fn label(&self) -> &str {
        "transform"
    }
}

/// Construye un stream de un solo valor.
pub fn single<T: Send + 'static>(value: T) -> ValueStream<T> {
    stream::iter(std::iter::once(Ok(value))).boxed()
}

/// Consume el stream y devuelve su última emisión (`None` si no emitió nada).
/// El primer `Err` aborta el consumo y se propaga.
pub async fn last_value<T>(mut values: ValueStream<T>) -> Result<Option<T>, BoxError> {
    let mut last = None;
    while let Some(item) = values.next().await {
        last = Some(item?);
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_value_returns_final_emission() {
        let values: ValueStream<i32> = stream::iter(vec![Ok(1), Ok(2), Ok(3)]).boxed();
        assert_eq!(last_value(values).await.expect("stream ok"), Some(3));
    }

    #[tokio::test]
    async fn last_value_of_empty_stream_is_none() {
        let values: ValueStream<i32> = stream::empty().boxed();
        assert_eq!(last_value(values).await.expect("stream ok"), None);
    }

    #[tokio::test]
    async fn last_value_propagates_first_error() {
        let values: ValueStream<i32> = stream::iter(vec![Ok(1), Err(BoxError::from("boom")), Ok(3)]).boxed();
        let err = last_value(values).await.expect_err("should reject");
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn resolve_handles_every_variant() {
        let ready: Applied<i32> = Applied::Ready(Some(1));
        let pending: Applied<i32> = Applied::Pending(Box::pin(async { Ok::<_, BoxError>(Some(2)) }));
        let streamed: Applied<i32> = Applied::Stream(single(3));
        assert_eq!(ready.resolve().await.unwrap(), Some(1));
        assert_eq!(pending.resolve().await.unwrap(), Some(2));
        assert_eq!(streamed.resolve().await.unwrap(), Some(3));
    }
}
