//! Composite implementations
//!
//! A [`Component`] is the invocable half of a composite element. It is either
//! a plain function of its props or an asynchronous one; both produce a new
//! [`Node`], and returning [`Node::Null`] means "render nothing".

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture, FutureExt};

use crate::element::{Node, Props};
use crate::error::ComponentError;

/// Result of invoking a component
pub type ComponentResult = Result<Node, ComponentError>;

/// Future returned by an asynchronous component
pub type RenderFuture = BoxFuture<'static, ComponentResult>;

/// Synchronous render function
pub type SyncRenderFn = Arc<dyn Fn(Props) -> ComponentResult + Send + Sync>;

/// Asynchronous render function
pub type AsyncRenderFn = Arc<dyn Fn(Props) -> RenderFuture + Send + Sync>;

/// How a component produces its output
#[derive(Clone)]
pub enum Render {
    /// Returns immediately
    Sync(SyncRenderFn),
    /// May suspend (I/O, timers)
    Async(AsyncRenderFn),
}

/// Named, cheaply clonable component implementation
#[derive(Clone)]
pub struct Component {
    name: Arc<str>,
    render: Render,
}

impl Component {
    /// Create a component from a synchronous render function
    pub fn new<F>(name: impl Into<Arc<str>>, render: F) -> Self
    where
        F: Fn(Props) -> ComponentResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            render: Render::Sync(Arc::new(render)),
        }
    }

    /// Create a component from an asynchronous render function
    pub fn new_async<F, Fut>(name: impl Into<Arc<str>>, render: F) -> Self
    where
        F: Fn(Props) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ComponentResult> + Send + 'static,
    {
        Self {
            name: name.into(),
            render: Render::Async(Arc::new(move |props| render(props).boxed())),
        }
    }

    /// Get the component name (used in logs and errors)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the component may suspend
    pub fn is_async(&self) -> bool {
        matches!(self.render, Render::Async(_))
    }

    /// Get the render function
    pub fn render(&self) -> &Render {
        &self.render
    }

    /// Invoke the component with its props
    pub fn invoke(&self, props: Props) -> RenderFuture {
        match &self.render {
            Render::Sync(render) => future::ready(render(props)).boxed(),
            Render::Async(render) => render(props),
        }
    }

    fn render_ptr(&self) -> *const () {
        match &self.render {
            Render::Sync(render) => Arc::as_ptr(render) as *const (),
            Render::Async(render) => Arc::as_ptr(render) as *const (),
        }
    }
}

/// Components are equal when they share the same implementation
impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.render_ptr() == other.render_ptr()
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("async", &self.is_async())
            .finish()
    }
}
