// conveyor/src/pipeline/definition.rs

//! The `Pipeline` struct and the methods that shape its list of steps.

use crate::core::context::Handler;
use crate::core::step::{SkipCondition, StepDef};
use crate::error::{ConveyorError, ConveyorResult};
use std::collections::HashMap;

/// An ordered set of named steps over the context type `TData`.
///
/// `Err` is what handlers return. It must absorb `ConveyorError` so the engine can report
/// its own failures (for instance a required step with no handler) through the same type.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<ConveyorError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<ConveyorError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(name, optional, skip_if)` tuples, in execution order.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_if.clone(),
      })
      .collect();

    Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub(crate) fn step_index(&self, step_name: &str) -> ConveyorResult<usize> {
    self
      .steps
      .iter()
      .position(|s| s.name == step_name)
      .ok_or_else(|| ConveyorError::StepNotFound {
        step_name: step_name.to_string(),
      })
  }

  fn ensure_step_absent(&self, step_name: &str) -> ConveyorResult<()> {
    if self.steps.iter().any(|s| s.name == step_name) {
      return Err(ConveyorError::Internal(format!(
        "step '{}' is already defined",
        step_name
      )));
    }
    Ok(())
  }

  fn insert_at(
    &mut self,
    idx: usize,
    new_step_name: String,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) -> ConveyorResult<()> {
    self.ensure_step_absent(&new_step_name)?;
    self.steps.insert(
      idx,
      StepDef {
        name: new_step_name,
        optional,
        skip_if,
      },
    );
    Ok(())
  }

  pub fn insert_before_step<S: Into<String>>(
    &mut self,
    existing_step_name: &str,
    new_step_name: S,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) -> ConveyorResult<()> {
    let idx = self.step_index(existing_step_name)?;
    self.insert_at(idx, new_step_name.into(), optional, skip_if)
  }

  pub fn insert_after_step<S: Into<String>>(
    &mut self,
    existing_step_name: &str,
    new_step_name: S,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) -> ConveyorResult<()> {
    let idx = self.step_index(existing_step_name)?;
    self.insert_at(idx + 1, new_step_name.into(), optional, skip_if)
  }

  /// Removes a step together with every handler registered for it.
  pub fn remove_step(&mut self, step_name: &str) -> ConveyorResult<()> {
    let idx = self.step_index(step_name)?;
    self.steps.remove(idx);
    self.before.remove(step_name);
    self.on.remove(step_name);
    self.after.remove(step_name);
    Ok(())
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) -> ConveyorResult<()> {
    let idx = self.step_index(step_name)?;
    self.steps[idx].optional = optional;
    Ok(())
  }

  pub fn set_skip_condition(
    &mut self,
    step_name: &str,
    skip_if: Option<SkipCondition<TData>>,
  ) -> ConveyorResult<()> {
    let idx = self.step_index(step_name)?;
    self.steps[idx].skip_if = skip_if;
    Ok(())
  }
}
