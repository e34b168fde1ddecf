//! Component Renderer
//!
//! Instantiates a component type, binds its parameters, drives its
//! lifecycle (and that of every nested child) on a per-call dispatcher and
//! serializes the finalized render tree.

mod cancellation;
mod dispatcher;

pub use cancellation::CancellationToken;
pub use dispatcher::active_dispatchers;

use crate::component::{Component, LifecycleContext};
use crate::error::RenderError;
use crate::html::HtmlSerializer;
use crate::logging::{LogField, LogLevel, Logger, TracingLogger};
use crate::module::TypeHandle;
use crate::parameters::ParameterSet;
use crate::render_tree::{RenderFrame, RenderTree, RenderTreeBuilder};
use dispatcher::Dispatcher;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Default limit on component nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Renderer configuration
#[derive(Clone)]
pub struct RendererConfig {
    pub logger: Arc<dyn Logger>,
    /// Deepest allowed nesting level; the root component is level 0.
    pub max_depth: usize,
}

impl RendererConfig {
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        RendererConfig {
            logger: Arc::new(TracingLogger::default()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

type RenderFuture<'a> = Pin<Box<dyn Future<Output = Result<(), RenderError>> + 'a>>;

/// Renders components to HTML strings.
pub struct HtmlRenderer {
    config: RendererConfig,
    serializer: HtmlSerializer,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

impl HtmlRenderer {
    pub fn new(config: RendererConfig) -> Self {
        HtmlRenderer {
            config,
            serializer: HtmlSerializer::new(),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Render `handle` with `parameters` to HTML.
    pub fn render(&self, handle: &TypeHandle, parameters: ParameterSet) -> Result<String, RenderError> {
        self.render_with_cancellation(handle, parameters, &CancellationToken::new())
    }

    /// Render a native component type.
    pub fn render_component<T: Component + Default + 'static>(
        &self,
        parameters: ParameterSet,
    ) -> Result<String, RenderError> {
        self.render(&TypeHandle::native::<T>(), parameters)
    }

    pub fn render_with_cancellation(
        &self,
        handle: &TypeHandle,
        parameters: ParameterSet,
        cancellation: &CancellationToken,
    ) -> Result<String, RenderError> {
        let tree = self.render_tree_with_cancellation(handle, parameters, cancellation)?;
        let html = self.serializer.serialize(&tree);

        let length = html.len().to_string();
        self.config.logger.log(
            LogLevel::Info,
            &format!("Rendered HTML is:\n{}", html),
            &[
                LogField::new("component", handle.name()),
                LogField::new("length", &length),
            ],
        );

        Ok(html)
    }

    /// Render `handle` and return the finalized tree instead of HTML.
    pub fn render_tree(&self, handle: &TypeHandle, parameters: ParameterSet) -> Result<RenderTree, RenderError> {
        self.render_tree_with_cancellation(handle, parameters, &CancellationToken::new())
    }

    pub fn render_tree_with_cancellation(
        &self,
        handle: &TypeHandle,
        parameters: ParameterSet,
        cancellation: &CancellationToken,
    ) -> Result<RenderTree, RenderError> {
        if !handle.is_component() {
            return Err(RenderError::InvalidComponentType {
                name: handle.name().to_string(),
            });
        }
        if cancellation.is_cancelled() {
            return Err(RenderError::Cancelled);
        }

        // Inside a caller's runtime the dispatcher runs on its own thread.
        let result = if tokio::runtime::Handle::try_current().is_ok() {
            std::thread::scope(|scope| {
                let worker = scope.spawn(|| self.dispatch(handle, parameters, cancellation));
                match worker.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            })
        } else {
            self.dispatch(handle, parameters, cancellation)
        };

        match result {
            Err(RenderError::Lifecycle { .. }) if cancellation.is_cancelled() => Err(RenderError::Cancelled),
            Err(err) => {
                let message = err.to_string();
                self.config.logger.log(
                    LogLevel::Error,
                    "Render failed",
                    &[
                        LogField::new("component", handle.name()),
                        LogField::new("error", &message),
                    ],
                );
                Err(err)
            }
            ok => ok,
        }
    }

    fn dispatch(
        &self,
        handle: &TypeHandle,
        parameters: ParameterSet,
        cancellation: &CancellationToken,
    ) -> Result<RenderTree, RenderError> {
        let dispatcher = Dispatcher::new().map_err(RenderError::Dispatcher)?;
        dispatcher.invoke(async {
            tokio::select! {
                biased;
                _ = cancellation.cancelled() => Err(RenderError::Cancelled),
                result = self.render_root(handle, parameters, cancellation) => result,
            }
        })
    }

    async fn render_root(
        &self,
        handle: &TypeHandle,
        parameters: ParameterSet,
        cancellation: &CancellationToken,
    ) -> Result<RenderTree, RenderError> {
        let mut tree = RenderTree::new();
        self.render_child(handle.clone(), parameters, 0, cancellation, &mut tree)
            .await?;
        Ok(tree)
    }

    fn render_child<'a>(
        &'a self,
        handle: TypeHandle,
        parameters: ParameterSet,
        depth: usize,
        cancellation: &'a CancellationToken,
        tree: &'a mut RenderTree,
    ) -> RenderFuture<'a> {
        Box::pin(async move {
            let name = handle.name().to_string();
            let factory = handle
                .as_component()
                .ok_or_else(|| RenderError::InvalidComponentType { name: name.clone() })?;
            if depth > self.config.max_depth {
                return Err(RenderError::DepthExceeded {
                    component: name,
                    max_depth: self.config.max_depth,
                });
            }
            check_cancelled(cancellation)?;

            let depth_str = depth.to_string();
            self.config.logger.log(
                LogLevel::Debug,
                "Rendering component",
                &[
                    LogField::new("component", &name),
                    LogField::new("depth", &depth_str),
                ],
            );

            let mut component = factory.instantiate();
            component
                .set_parameters(parameters)
                .map_err(|source| lifecycle_error(&name, source))?;

            let ctx = LifecycleContext::new(name.clone(), depth, cancellation.clone());
            component
                .on_initialized(&ctx)
                .await
                .map_err(|source| lifecycle_error(&name, source))?;
            check_cancelled(cancellation)?;

            let mut builder = RenderTreeBuilder::new();
            component
                .build_render_tree(&mut builder)
                .map_err(|source| lifecycle_error(&name, source))?;
            let frames = builder
                .finish()
                .map_err(|source| lifecycle_error(&name, source.into()))?;

            for frame in frames {
                match frame {
                    RenderFrame::Component(child) => {
                        tree.push(RenderFrame::ComponentStart {
                            type_name: child.handle.name().to_string(),
                        });
                        self.render_child(child.handle, child.parameters, depth + 1, cancellation, tree)
                            .await?;
                        tree.push(RenderFrame::ComponentEnd);
                    }
                    frame => tree.push(frame),
                }
            }
            Ok(())
        })
    }
}

fn check_cancelled(cancellation: &CancellationToken) -> Result<(), RenderError> {
    if cancellation.is_cancelled() {
        Err(RenderError::Cancelled)
    } else {
        Ok(())
    }
}

fn lifecycle_error(component: &str, source: anyhow::Error) -> RenderError {
    RenderError::Lifecycle {
        component: component.to_string(),
        source,
    }
}
