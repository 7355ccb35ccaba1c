//! Response rendering
//!
//! Given a request path, produce the response text and its content type.
//! The document path answers with a full HTML document carrying the payload
//! in a bootstrap script; every other path answers with the bare payload.

use rsc_core::{Node, Props};
use rsc_wire::BOOTSTRAP_GLOBAL;
use serde::{Deserialize, Serialize};

use crate::evaluator::{Evaluator, EvaluatorConfig};
use crate::router::{path_only, RouteRequest, Router};
use crate::ResponseResult;

/// Content type of a document response
pub const DOCUMENT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Response renderer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Path answered with a full document
    pub document_path: String,
    /// Client entry module loaded by the document
    pub bootstrap_module: String,
    /// Document `<title>`
    pub document_title: String,
    /// Evaluator settings
    pub evaluator: EvaluatorConfig,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            document_path: "/".to_string(),
            bootstrap_module: "src/client/index.js".to_string(),
            document_title: "App".to_string(),
            evaluator: EvaluatorConfig::default(),
        }
    }
}

/// A rendered response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResponse {
    pub content_type: &'static str,
    pub body: String,
}

impl RenderedResponse {
    pub fn is_document(&self) -> bool {
        self.content_type == DOCUMENT_CONTENT_TYPE
    }
}

/// Evaluates routed trees and renders them as responses
pub struct ResponseRenderer<R: Router> {
    router: R,
    evaluator: Evaluator,
    config: ResponderConfig,
}

impl<R: Router> ResponseRenderer<R> {
    pub fn new(router: R, config: ResponderConfig) -> Self {
        let evaluator = Evaluator::with_config(config.evaluator.clone());
        Self {
            router,
            evaluator,
            config,
        }
    }

    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Route, evaluate and render a request
    pub async fn respond(&self, path: &str, props: Props) -> ResponseResult<RenderedResponse> {
        let request = RouteRequest::from_path(path, props);
        log::debug!("Routing `{}` to `{}`", path, request.component_name());
        let root = self.router.route(request)?;
        self.render(path, root).await
    }

    /// Evaluate and render an already routed root node
    pub async fn render(&self, path: &str, root: Node) -> ResponseResult<RenderedResponse> {
        let tree = self.evaluator.evaluate(root).await?;
        let payload = rsc_wire::encode(&tree)?;

        if path_only(path) == self.config.document_path {
            log::debug!("Rendering document for `{}` ({} bytes payload)", path, payload.len());
            Ok(RenderedResponse {
                content_type: DOCUMENT_CONTENT_TYPE,
                body: self.document(&payload),
            })
        } else {
            Ok(RenderedResponse {
                content_type: rsc_wire::CONTENT_TYPE,
                body: payload,
            })
        }
    }

    /// Wrap an encoded payload in the bootstrap document
    pub fn document(&self, payload: &str) -> String {
        format!(
            concat!(
                "<!DOCTYPE html>",
                "<html><head><meta charset=\"utf-8\"><title>{title}</title></head>",
                "<body><div id=\"root\"></div>",
                "<script>window.{global} = {payload};</script>",
                "<script type=\"module\" src=\"{module}\"></script>",
                "</body></html>"
            ),
            title = escape_html(&self.config.document_title),
            global = BOOTSTRAP_GLOBAL,
            payload = rsc_wire::script_safe(payload),
            module = escape_html(&self.config.bootstrap_module),
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
