//! Client tree resolver
//!
//! Replaces every boundary reference in a decoded tree with a composite
//! built from the loaded module, so the presentation layer receives live
//! component instances. Siblings resolve concurrently and keep their input
//! order.

use futures_util::future::{join_all, BoxFuture, FutureExt};
use rsc_core::{Component, Element, ElementKind, Key, Node, Props, StructuralError};
use thiserror::Error;

use crate::cache::ModuleCache;
use crate::loader::{ModuleLoadError, ModuleLoader};

/// Resolution errors
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Load(#[from] ModuleLoadError),

    #[error(transparent)]
    Structural(#[from] StructuralError),
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Turns serializable trees into presentable ones
pub struct Resolver<L: ModuleLoader> {
    modules: ModuleCache<L>,
}

impl<L: ModuleLoader> Resolver<L> {
    /// Create a resolver loading modules through a fresh cache
    pub fn new(loader: L) -> Self {
        Self::with_cache(ModuleCache::new(loader))
    }

    pub fn with_cache(modules: ModuleCache<L>) -> Self {
        Self { modules }
    }

    /// Get the module cache
    pub fn modules(&self) -> &ModuleCache<L> {
        &self.modules
    }

    /// Resolve a tree
    pub fn resolve(&self, node: Node) -> BoxFuture<'_, ResolveResult<Node>> {
        async move {
            match node {
                Node::Array(items) => {
                    let branches = items.into_iter().map(|item| self.resolve(item));
                    let resolved = join_all(branches)
                        .await
                        .into_iter()
                        .collect::<ResolveResult<Vec<_>>>()?;
                    Ok(Node::Array(resolved))
                }
                Node::Object(map) => Ok(Node::Object(self.resolve_props(map).await?)),
                Node::Element(element) => self.resolve_element(element).await,
                primitive => Ok(primitive),
            }
        }
        .boxed()
    }

    async fn resolve_props(&self, props: Props) -> ResolveResult<Props> {
        let (names, values): (Vec<String>, Vec<Node>) = props.into_iter().unzip();
        let results = join_all(values.into_iter().map(|value| self.resolve(value))).await;
        names
            .into_iter()
            .zip(results)
            .map(|(name, result)| result.map(|value| (name, value)))
            .collect()
    }

    async fn resolve_element(&self, element: Element) -> ResolveResult<Node> {
        let (kind, props, key) = element.into_parts();
        match kind {
            ElementKind::Fragment | ElementKind::Intrinsic(_) => {
                let props = self.resolve_props(props).await?;
                Ok(Node::Element(Element::new(kind, props, key)))
            }
            ElementKind::BoundaryReference(module_path) => {
                self.instantiate(&module_path, props, key).await
            }
            ElementKind::Composite(component) => Err(ResolveError::Structural(
                StructuralError::new(format!(
                    "live component `{}` in a decoded tree",
                    component.name()
                )),
            )),
        }
    }

    async fn instantiate(
        &self,
        module_path: &str,
        props: Props,
        key: Option<Key>,
    ) -> ResolveResult<Node> {
        let (component, props) =
            futures_util::join!(self.load(module_path), self.resolve_props(props));
        let component = component?;
        let props = props?;
        log::trace!("Resolved `{}` to `{}`", module_path, component.name());
        Ok(Node::Element(Element::new(
            ElementKind::Composite(component),
            props,
            key,
        )))
    }

    async fn load(&self, module_path: &str) -> ResolveResult<Component> {
        Ok(self.modules.load(module_path).await?)
    }
}
