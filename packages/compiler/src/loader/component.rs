//! Compiled components
//!
//! Component factory and instances backed by a lowered `Program`.

use super::eval::execute;
use super::program::Program;
use anyhow::Context;
use quill_runtime::{
    Component, ComponentDescriptor, ComponentFactory, LifecycleContext, LifecycleFuture, ParameterSet,
    RenderTreeBuilder, Value,
};
use std::sync::Arc;

pub struct CompiledComponentFactory {
    program: Arc<Program>,
    descriptor: ComponentDescriptor,
}

impl CompiledComponentFactory {
    pub fn new(program: Program, descriptor: ComponentDescriptor) -> Self {
        CompiledComponentFactory {
            program: Arc::new(program),
            descriptor,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }
}

impl ComponentFactory for CompiledComponentFactory {
    fn descriptor(&self) -> &ComponentDescriptor {
        &self.descriptor
    }

    fn instantiate(&self) -> Box<dyn Component> {
        Box::new(CompiledComponent {
            program: Arc::clone(&self.program),
            slots: vec![Value::Null; self.program.slot_count],
        })
    }
}

/// One instance per render call. Parameter values live in their slots;
/// locals get fresh copies for every `build_render_tree`.
pub struct CompiledComponent {
    program: Arc<Program>,
    slots: Vec<Value>,
}

impl Component for CompiledComponent {
    fn set_parameters(&mut self, parameters: ParameterSet) -> anyhow::Result<()> {
        for (name, value) in parameters.iter() {
            if let Some(slot) = self.program.parameter_slot(name) {
                self.slots[slot] = value.clone();
            }
        }
        Ok(())
    }

    fn on_initialized<'a>(&'a mut self, ctx: &'a LifecycleContext) -> LifecycleFuture<'a> {
        Box::pin(async move {
            let program = Arc::clone(&self.program);
            for param in &program.parameters {
                let deferred = match &self.slots[param.slot] {
                    Value::Deferred(deferred) => deferred.clone(),
                    _ => continue,
                };
                let value = ctx
                    .suspend(deferred.load())
                    .await?
                    .with_context(|| format!("Failed to load parameter '{}'", param.name))?;
                self.slots[param.slot] = value;
            }
            Ok(())
        })
    }

    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) -> anyhow::Result<()> {
        let mut slots = self.slots.clone();
        execute(&self.program.body, &mut slots, builder)
    }
}
