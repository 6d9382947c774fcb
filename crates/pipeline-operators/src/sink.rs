//! Operador `bind_sink`: publica cada valor en un destino externo y lo
//! reenvía sin cambios.

use std::sync::Arc;

use futures_util::stream::StreamExt;
use pipeline_core::{StreamOperator, ValueStream};
use tokio::sync::watch;

/// Destino con un método `set`. El operador lo llama con una copia de cada
/// valor que pasa.
pub trait ValueSink<T>: Send + Sync {
    fn set(&self, value: T);
}

impl<T: Send + Sync> ValueSink<T> for watch::Sender<T> {
    fn set(&self, value: T) {
        // sin receptores el valor igual queda guardado
        self.send_replace(value);
    }
}

impl<T, S> ValueSink<T> for Arc<S>
    where S: ValueSink<T> + ?Sized
{
    fn set(&self, value: T) {
        (**self).set(value)
    }
}

/// Sin destino (`None`) el operador es la identidad.
pub fn bind_sink<T, S>(sink: Option<S>) -> StreamOperator<T>
    where T: Clone + Send + 'static,
          S: ValueSink<T> + 'static
{
    let sink = sink.map(Arc::new);
    StreamOperator::new(move |input: ValueStream<T>| {
        let sink = sink.clone();
        input.inspect(move |item| {
                 if let (Some(sink), Ok(value)) = (&sink, item) {
                     sink.set(value.clone());
                 }
             })
             .boxed()
    }).named("bind_sink")
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use pipeline_core::{last_value, single};

    #[tokio::test]
    async fn values_are_published_and_forwarded() {
        let (tx, rx) = watch::channel(0);
        let op = bind_sink(Some(tx));
        let input = stream::iter(vec![Ok(1), Ok(2)]).boxed();
        let out: Vec<i32> = op.pipe(input).map(|r| r.unwrap()).collect().await;
        assert_eq!(out, vec![1, 2]);
        assert_eq!(*rx.borrow(), 2);
    }

    #[tokio::test]
    async fn missing_sink_is_identity() {
        let op = bind_sink::<i32, watch::Sender<i32>>(None);
        assert_eq!(last_value(op.pipe(single(4))).await.unwrap(), Some(4));
    }
}
