//! pipeline-core: motor de pipeline de operadores reconfigurable.
pub mod engine;
pub mod errors;
pub mod probe;
pub mod registry;
pub mod step;

pub use engine::{EngineOptions, OperatorPipeline};
pub use errors::{OperandMismatch, PipelineError};
pub use probe::{classify, OperatorKind};
pub use registry::{OperatorHandle, Snapshot, StepInfo, StepRegistry};
pub use step::{last_value, single, Applied, AsyncTransform, BoxError, Operand, PlainTransform, SharedTransform, Step, StepId,
               StreamOperator, Transform, ValueStream};
