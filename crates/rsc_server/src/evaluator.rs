//! Server tree evaluator
//!
//! Walks a tree top-down, invoking composite implementations until only
//! fragments, intrinsics, boundary references and plain data remain.
//!
//! Every fan-out (array items, prop values, mapping values) builds all branch
//! futures first and drives them together with `join_all`; results land at
//! their input position no matter which branch settles first. When several
//! branches fail, the first failure in input order is reported, after every
//! branch has settled.

use futures_util::future::{join_all, BoxFuture, FutureExt};
use rsc_core::{
    assign_sibling_keys, Component, Element, ElementKind, Key, Node, Props, StructuralError,
    BOUNDARY_PROP,
};
use serde::{Deserialize, Serialize};

use crate::{EvalError, EvalResult};

/// Evaluator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Prop that marks a composite as a client boundary
    pub boundary_prop: String,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            boundary_prop: BOUNDARY_PROP.to_string(),
        }
    }
}

/// Turns a root element into a serializable tree
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    /// Create an evaluator with the default boundary prop
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an evaluator with custom configuration
    pub fn with_config(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate a tree
    pub async fn evaluate(&self, node: Node) -> EvalResult<Node> {
        self.evaluate_with_hint(node, None).await
    }

    /// Evaluate a tree, giving the root `key_hint` unless it has its own key
    pub fn evaluate_with_hint(
        &self,
        node: Node,
        key_hint: Option<Key>,
    ) -> BoxFuture<'_, EvalResult<Node>> {
        async move {
            match node {
                Node::Array(items) => self.evaluate_array(items).await,
                Node::Object(map) => Ok(Node::Object(self.evaluate_props(map).await?)),
                Node::Element(element) => self.evaluate_element(element, key_hint).await,
                primitive => Ok(primitive),
            }
        }
        .boxed()
    }

    async fn evaluate_array(&self, items: Vec<Node>) -> EvalResult<Node> {
        let branches = items
            .into_iter()
            .map(|item| self.evaluate_with_hint(item, None));
        let evaluated = join_all(branches)
            .await
            .into_iter()
            .collect::<EvalResult<Vec<_>>>()?;
        Ok(Node::Array(assign_sibling_keys(evaluated)))
    }

    async fn evaluate_props(&self, props: Props) -> EvalResult<Props> {
        let (names, values): (Vec<String>, Vec<Node>) = props.into_iter().unzip();
        let branches = values
            .into_iter()
            .map(|value| self.evaluate_with_hint(value, None));
        let results = join_all(branches).await;
        names
            .into_iter()
            .zip(results)
            .map(|(name, result)| result.map(|value| (name, value)))
            .collect()
    }

    async fn evaluate_element(&self, element: Element, key_hint: Option<Key>) -> EvalResult<Node> {
        let (kind, props, key) = element.into_parts();
        let key = key.or(key_hint);

        match kind {
            ElementKind::Fragment | ElementKind::Intrinsic(_) => {
                let props = self.evaluate_props(props).await?;
                Ok(Node::Element(Element::new(kind, props, key)))
            }
            ElementKind::Composite(component) => {
                match self.boundary_module(&component, &props)? {
                    Some(module_path) => self.defer(component, module_path, props, key).await,
                    None => {
                        log::trace!("Invoking component `{}`", component.name());
                        let rendered = component.invoke(props).await.map_err(|source| {
                            EvalError::Implementation {
                                component: component.name().to_string(),
                                source,
                            }
                        })?;
                        self.evaluate_with_hint(rendered, key).await
                    }
                }
            }
            ElementKind::BoundaryReference(module_path) => {
                Err(EvalError::Structural(StructuralError::new(format!(
                    "boundary reference `{}` in server input",
                    module_path
                ))))
            }
        }
    }

    /// Emit a reference in place of a client boundary, without invoking it
    async fn defer(
        &self,
        component: Component,
        module_path: String,
        mut props: Props,
        key: Option<Key>,
    ) -> EvalResult<Node> {
        log::debug!(
            "Deferring `{}` to client module `{}`",
            component.name(),
            module_path
        );
        props.shift_remove(&self.config.boundary_prop);
        let props = self.evaluate_props(props).await?;
        Ok(Node::Element(Element::new(
            ElementKind::BoundaryReference(module_path),
            props,
            key,
        )))
    }

    fn boundary_module(&self, component: &Component, props: &Props) -> EvalResult<Option<String>> {
        match props.get(&self.config.boundary_prop) {
            None => Ok(None),
            Some(Node::String(path)) => Ok(Some(path.clone())),
            Some(other) => Err(EvalError::Structural(StructuralError::new(format!(
                "boundary marker on `{}` must be a module path string, got {}",
                component.name(),
                other.type_name()
            )))),
        }
    }
}
