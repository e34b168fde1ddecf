//! Component capability
//!
//! A component receives a parameter set, may run an asynchronous
//! initialization step, and contributes frames to a render tree.

use crate::parameters::ParameterSet;
use crate::render_tree::RenderTreeBuilder;
use crate::renderer::CancellationToken;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

/// Future returned by [`Component::on_initialized`].
pub type LifecycleFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + 'a>>;

/// The render lifecycle of one component instance.
///
/// The renderer calls `set_parameters`, awaits `on_initialized`, then calls
/// `build_render_tree` exactly once, all on the dispatcher of the render call.
pub trait Component {
    fn set_parameters(&mut self, parameters: ParameterSet) -> anyhow::Result<()>;

    fn on_initialized<'a>(&'a mut self, _ctx: &'a LifecycleContext) -> LifecycleFuture<'a> {
        Box::pin(std::future::ready(Ok(())))
    }

    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) -> anyhow::Result<()>;
}

/// Base behavior selected for a component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BaseCapability {
    /// Standalone page; renderable at the top level only.
    Page,
    /// Composable component; may be nested inside other components.
    #[default]
    Component,
}

impl BaseCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseCapability::Page => "Page",
            BaseCapability::Component => "Component",
        }
    }
}

/// Static metadata of a component type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentDescriptor {
    pub capability: BaseCapability,
    /// Declared parameter names; `None` when the type accepts any parameter.
    pub parameters: Option<Vec<String>>,
    pub route: Option<String>,
}

impl ComponentDescriptor {
    pub fn accepts_parameter(&self, name: &str) -> bool {
        self.parameters
            .as_ref()
            .map_or(true, |declared| declared.iter().any(|p| p == name))
    }
}

/// Creates instances of one component type.
pub trait ComponentFactory: Send + Sync {
    fn descriptor(&self) -> &ComponentDescriptor;
    fn instantiate(&self) -> Box<dyn Component>;
}

/// Factory for Rust types implementing [`Component`] and [`Default`].
pub struct NativeComponentFactory<T> {
    descriptor: ComponentDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T> NativeComponentFactory<T> {
    pub fn new(descriptor: ComponentDescriptor) -> Self {
        NativeComponentFactory {
            descriptor,
            _marker: PhantomData,
        }
    }
}

impl<T> Default for NativeComponentFactory<T> {
    fn default() -> Self {
        Self::new(ComponentDescriptor::default())
    }
}

impl<T: Component + Default + 'static> ComponentFactory for NativeComponentFactory<T> {
    fn descriptor(&self) -> &ComponentDescriptor {
        &self.descriptor
    }

    fn instantiate(&self) -> Box<dyn Component> {
        Box::new(T::default())
    }
}

/// Context passed to asynchronous lifecycle steps.
#[derive(Debug, Clone)]
pub struct LifecycleContext {
    component: String,
    depth: usize,
    cancellation: CancellationToken,
}

impl LifecycleContext {
    pub fn new(component: impl Into<String>, depth: usize, cancellation: CancellationToken) -> Self {
        LifecycleContext {
            component: component.into(),
            depth,
            cancellation,
        }
    }

    pub fn component_name(&self) -> &str {
        &self.component
    }

    /// Nesting depth; the root component is at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Await `future` unless the render is cancelled first.
    pub async fn suspend<F: Future>(&self, future: F) -> anyhow::Result<F::Output> {
        if self.is_cancelled() {
            anyhow::bail!("render cancelled");
        }
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(anyhow::anyhow!("render cancelled")),
            output = future => Ok(output),
        }
    }
}
