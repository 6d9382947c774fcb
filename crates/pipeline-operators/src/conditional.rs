//! Operador `conditional`: transforma sólo los valores que cumplen un
//! predicado y descarta el resto.

use std::sync::Arc;

use futures_util::future;
use futures_util::stream::StreamExt;
use pipeline_core::{StreamOperator, ValueStream};

/// Los valores que no pasan el predicado no se emiten. Usado como step, eso
/// deja el valor actual del pipeline sin cambios.
pub fn conditional<T, P, F>(predicate: P, transform: F) -> StreamOperator<T>
    where T: Send + 'static,
          P: Fn(&T) -> bool + Send + Sync + 'static,
          F: Fn(T) -> T + Send + Sync + 'static
{
    let predicate = Arc::new(predicate);
    let transform = Arc::new(transform);
    StreamOperator::new(move |input: ValueStream<T>| {
        let predicate = Arc::clone(&predicate);
        let transform = Arc::clone(&transform);
        input.filter_map(move |item| {
                 let out = match item {
                     Ok(value) if predicate(&value) => Some(Ok(transform(value))),
                     Ok(_) => None,
                     Err(e) => Some(Err(e)),
                 };
                 future::ready(out)
             })
             .boxed()
    }).named("conditional")
}
