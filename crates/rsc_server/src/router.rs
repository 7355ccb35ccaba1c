//! Request routing
//!
//! A [`Router`] maps an incoming request onto the root node the evaluator
//! starts from. Routing is synchronous: any async work belongs to the
//! components in the returned tree.

use rsc_core::{Node, Props};

use crate::EvalResult;

/// A request addressed to a named root component
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    component_name: String,
    props: Props,
}

impl RouteRequest {
    pub fn new(component_name: impl Into<String>, props: Props) -> Self {
        Self {
            component_name: component_name.into(),
            props,
        }
    }

    /// Build a request from a URL path
    ///
    /// The query string and the leading `/` are dropped, so `"/"` routes to
    /// the empty name and `"/greeting?x=1"` to `"greeting"`.
    pub fn from_path(path: &str, props: Props) -> Self {
        Self::new(route_name(path), props)
    }

    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn into_props(self) -> Props {
        self.props
    }
}

/// Strip the query string from a request path
pub(crate) fn path_only(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn route_name(path: &str) -> &str {
    let path = path_only(path);
    path.strip_prefix('/').unwrap_or(path)
}

/// Maps requests onto root nodes
pub trait Router: Send + Sync {
    fn route(&self, request: RouteRequest) -> EvalResult<Node>;
}

impl<F> Router for F
where
    F: Fn(RouteRequest) -> EvalResult<Node> + Send + Sync,
{
    fn route(&self, request: RouteRequest) -> EvalResult<Node> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsc_core::Element;

    #[test]
    fn test_from_path() {
        assert_eq!(RouteRequest::from_path("/", Props::new()).component_name(), "");
        assert_eq!(
            RouteRequest::from_path("/greeting?lang=en", Props::new()).component_name(),
            "greeting"
        );
        assert_eq!(
            RouteRequest::from_path("settings", Props::new()).component_name(),
            "settings"
        );
    }

    #[test]
    fn test_closure_router() {
        let router = |request: RouteRequest| -> EvalResult<Node> {
            Ok(Node::from(Element::intrinsic(request.component_name())))
        };
        let node = router.route(RouteRequest::new("main", Props::new())).unwrap();
        assert_eq!(node.as_element().and_then(|e| e.kind().tag()), Some("main"));
    }
}
