//! Demo application
//!
//! The server side is a [`Router`] over three routes:
//!
//! - `""`: theme provider, slices, layout and app, all client boundaries
//! - `"greeting"`: an async server component that answers after a delay
//! - anything else: the "ups" page
//!
//! The client side is a [`ModuleRegistry`] holding a stand-in for every
//! module path those routes reference.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rsc_client::ModuleRegistry;
use rsc_core::{
    Component, ComponentResult, Element, ElementKind, Node, Props, BOUNDARY_PROP, CHILDREN_PROP,
};
use rsc_server::{EvalResult, RouteRequest, Router};

pub const THEME_PROVIDER_MODULE: &str = "components/theme-provider";
pub const SLICES_MODULE: &str = "slices";
pub const LAYOUT_MODULE: &str = "components/layout";
pub const APP_MODULE: &str = "components/app";
pub const GREETING_MODULE: &str = "components/greeting";
pub const UPS_MODULE: &str = "components/ups";

/// Title handed to the layout
pub const APP_TITLE: &str = "My App";

/// Greetings the server picks from
pub const GREETINGS: [&str; 2] = ["Whatsupp!!!", "How r u doing?"];

/// Routes requests onto the demo pages
#[derive(Debug, Clone)]
pub struct AppRouter {
    greeting_delay: Duration,
    boundary_prop: String,
}

impl AppRouter {
    pub fn new(greeting_delay: Duration) -> Self {
        Self {
            greeting_delay,
            boundary_prop: BOUNDARY_PROP.to_string(),
        }
    }

    /// Mark boundaries with `boundary_prop` instead of the default marker
    pub fn with_boundary_prop(mut self, boundary_prop: impl Into<String>) -> Self {
        self.boundary_prop = boundary_prop.into();
        self
    }

    fn home(&self) -> Node {
        let app = boundary(&self.boundary_prop, "App", APP_MODULE);
        let layout = boundary(&self.boundary_prop, "Layout", LAYOUT_MODULE)
            .prop("title", APP_TITLE)
            .child(app);
        let slices = boundary(&self.boundary_prop, "Slices", SLICES_MODULE).child(layout);
        Node::from(
            boundary(&self.boundary_prop, "ThemeProvider", THEME_PROVIDER_MODULE)
                .prop("theme", theme())
                .child(slices),
        )
    }
}

impl Router for AppRouter {
    fn route(&self, request: RouteRequest) -> EvalResult<Node> {
        match request.component_name() {
            "" => Ok(self.home()),
            "greeting" => Ok(Node::from(Element::new(
                ElementKind::Composite(greeting(self.greeting_delay, &self.boundary_prop)),
                request.into_props(),
                None,
            ))),
            other => {
                log::debug!("No route for `{}`", other);
                Ok(Node::from(boundary(&self.boundary_prop, "Ups", UPS_MODULE)))
            }
        }
    }
}

fn theme() -> Node {
    let mut title = Props::new();
    title.insert("fontSize".to_string(), Node::from("2rem"));
    let mut theme = Props::new();
    theme.insert("title".to_string(), Node::Object(title));
    Node::Object(theme)
}

/// A client boundary for `module_path`
///
/// The server-side implementation is a stand-in the evaluator never invokes.
fn boundary(boundary_prop: &str, name: &'static str, module_path: &str) -> Element {
    Element::boundary(Component::new(name, |_| Ok(Node::Null)), boundary_prop, module_path)
}

/// Async server component answering with a greeting after `delay`
pub fn greeting(delay: Duration, boundary_prop: &str) -> Component {
    let boundary_prop = boundary_prop.to_string();
    Component::new_async("Greeting", move |_props: Props| {
        let boundary_prop = boundary_prop.clone();
        async move {
            tokio::time::sleep(delay).await;
            let pick = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.subsec_nanos() as usize % GREETINGS.len())
                .unwrap_or(0);
            Ok(Node::from(
                boundary(&boundary_prop, "Greeting", GREETING_MODULE)
                    .prop("greeting", GREETINGS[pick]),
            ))
        }
    })
}

fn children(props: &Props) -> Node {
    props.get(CHILDREN_PROP).cloned().unwrap_or(Node::Null)
}

fn pass_children(props: Props) -> ComponentResult {
    Ok(Node::from(Element::fragment(vec![children(&props)])))
}

fn layout(props: Props) -> ComponentResult {
    let title = props.get("title").cloned().unwrap_or(Node::Null);
    Ok(Node::from(
        Element::intrinsic("html")
            .child(Element::intrinsic("head").child(Element::intrinsic("title").child(title)))
            .child(Element::intrinsic("body").prop(CHILDREN_PROP, children(&props))),
    ))
}

fn app(_props: Props) -> ComponentResult {
    Ok(Node::from(
        Element::intrinsic("main")
            .child(Element::intrinsic("h1").child("RSC + SSR"))
            .child(Element::intrinsic("button").child("get Greeting of the Day (from server)")),
    ))
}

fn greeting_view(props: Props) -> ComponentResult {
    let greeting = props.get("greeting").cloned().unwrap_or(Node::Null);
    Ok(Node::from(Element::intrinsic("div").child(greeting)))
}

fn ups(_props: Props) -> ComponentResult {
    Ok(Node::from(Element::intrinsic("div").child("Ups! Nothing here.")))
}

/// Client implementations for every module the router references
pub fn client_modules() -> ModuleRegistry {
    ModuleRegistry::new()
        .with(THEME_PROVIDER_MODULE, Component::new("ThemeProvider", pass_children))
        .with(SLICES_MODULE, Component::new("Slices", pass_children))
        .with(LAYOUT_MODULE, Component::new("Layout", layout))
        .with(APP_MODULE, Component::new("App", app))
        .with(GREETING_MODULE, Component::new("Greeting", greeting_view))
        .with(UPS_MODULE, Component::new("Ups", ups))
}
