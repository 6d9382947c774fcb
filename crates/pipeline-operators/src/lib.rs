//! pipeline-operators: fábricas de operadores de stream para el pipeline.
//!
//! Todos devuelven `StreamOperator<T>`, listo para `OperatorPipeline::add`
//! o para usarse directamente con `pipe`.
pub mod conditional;
pub mod easing;
pub mod eventually;
pub mod keyframe;
pub mod sink;
pub mod tween;

pub use conditional::conditional;
pub use eventually::eventually;
pub use keyframe::{keyframe, try_keyframe, Delays, Keyframe};
pub use sink::{bind_sink, ValueSink};
pub use tween::{tween, tween_with, Interpolate, Tween, TWEEN_STEPS};
