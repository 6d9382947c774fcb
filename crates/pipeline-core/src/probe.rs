//! Sondeo de capacidades: decide si una transformación es un operador de
//! stream o una transformación plana.
//!
//! Estrategia estructural: se aplica la transformación a un stream de un solo
//! valor y se mira si el resultado es a su vez un stream. Los streams son
//! perezosos, así que el resultado se descarta sin consumirlo. Cualquier
//! error durante el sondeo clasifica como `PlainTransform`.
//!
//! No hay caché: se sondea en cada aplicación. Una implementación propia de
//! `Transform` con efectos en `apply` los verá ejecutarse dos veces (sondeo
//! y llamada real); los adaptadores de `step::adapters` no tienen ese
//! problema porque rechazan el operando antes de invocar al closure.

use log::trace;
use serde::Serialize;

use crate::step::{single, Operand, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperatorKind {
    PlainTransform,
    StreamOperator,
}

/// Clasifica `transform` usando `probe` como valor del stream de prueba.
pub fn classify<T>(transform: &dyn Transform<T>, probe: &T) -> OperatorKind
    where T: Clone + Send + 'static
{
    match transform.apply(Operand::Stream(single(probe.clone()))) {
        Ok(applied) if applied.is_stream() => OperatorKind::StreamOperator,
        Ok(_) => OperatorKind::PlainTransform,
        Err(signal) => {
            trace!("probe of `{}` rejected the stream operand: {signal}", transform.label());
            OperatorKind::PlainTransform
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Applied, BoxError, PlainTransform, StreamOperator, ValueStream};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn closures_classify_by_adapter() {
        let plain = PlainTransform::sync(|v: i32| v + 1);
        let op = StreamOperator::new(|input: ValueStream<i32>| input);
        assert_eq!(classify(&plain, &0), OperatorKind::PlainTransform);
        assert_eq!(classify(&op, &0), OperatorKind::StreamOperator);
    }

    // Acepta ambos operandos pero sólo devuelve stream si recibe uno.
    struct ArityDependent;

    impl Transform<i32> for ArityDependent {
        fn apply(&self, operand: Operand<i32>) -> Result<Applied<i32>, BoxError> {
            match operand {
                Operand::Value(v) => Ok(Applied::Ready(Some(v))),
                Operand::Stream(s) => Ok(Applied::Stream(s)),
            }
        }
    }

    struct AlwaysFails;

    impl Transform<i32> for AlwaysFails {
        fn apply(&self, _operand: Operand<i32>) -> Result<Applied<i32>, BoxError> {
            Err("always".into())
        }
    }

    // Devuelve un valor plano aun recibiendo un stream.
    struct CountsCalls(AtomicUsize);

    impl Transform<i32> for CountsCalls {
        fn apply(&self, _operand: Operand<i32>) -> Result<Applied<i32>, BoxError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Applied::Ready(Some(7)))
        }
    }

    #[test]
    fn custom_transforms_classify_by_result_shape() {
        assert_eq!(classify(&ArityDependent, &1), OperatorKind::StreamOperator);
        assert_eq!(classify(&AlwaysFails, &1), OperatorKind::PlainTransform);

        let counting = CountsCalls(AtomicUsize::new(0));
        assert_eq!(classify(&counting, &1), OperatorKind::PlainTransform);
        assert_eq!(counting.0.load(Ordering::SeqCst), 1);
    }
}
