//! Operador `eventually`: deja pasar valores hasta que uno cumple el
//! predicado (incluido) y emite sólo el último de ellos.

use std::sync::Arc;

use futures_util::future;
use futures_util::stream::{self, StreamExt};
use pipeline_core::{last_value, BoxError, StreamOperator, ValueStream};

/// Emite exactamente un valor: el primero que cumple `predicate`, o el
/// último recibido si la entrada termina antes. Con una entrada vacía no
/// emite nada.
pub fn eventually<T, P>(predicate: P) -> StreamOperator<T>
    where T: Send + 'static,
          P: Fn(&T) -> bool + Send + Sync + 'static
{
    let predicate = Arc::new(predicate);
    StreamOperator::new(move |input: ValueStream<T>| {
        let predicate = Arc::clone(&predicate);
        let taken = input.scan(false, move |done, item: Result<T, BoxError>| {
                             if *done {
                                 return future::ready(None);
                             }
                             *done = match &item {
                                 Ok(value) => predicate(value),
                                 Err(_) => true,
                             };
                             future::ready(Some(item))
                         })
                         .boxed();
        stream::once(last_value(taken)).filter_map(|res| future::ready(res.transpose()))
                                       .boxed()
    }).named("eventually")
}
