// conveyor/src/lib.rs

//! Conveyor: named-step async pipelines over a shared, lockable context.
//!
//! A pipeline is an ordered list of named steps. Each step can carry `before`, `on`
//! and `after` handlers which receive a clone of the pipeline's [`ContextData`] and
//! answer with a [`PipelineControl`]. Handlers can stop the run early, and the first
//! error they return aborts it. A [`Conveyor`] registry keeps one pipeline per context
//! type so callers only need the context value to dispatch a run.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{ConveyorError, ConveyorResult};

pub use crate::registry::Conveyor;
