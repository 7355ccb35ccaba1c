//! rsc
//!
//! Renders one request through the demo application and prints the response.
//!
//! Usage: `rsc [PATH] [--props JSON] [--hydrate]`
//!
//! Run with: cargo run --bin rsc -- /greeting --hydrate

use rsc_core::Props;
use rsc_runtime::{parse_props, Runtime, RuntimeConfig, RuntimeResult};

#[derive(Debug, Default)]
struct Args {
    path: Option<String>,
    props: Option<String>,
    hydrate: bool,
}

impl Args {
    fn parse() -> Self {
        let mut args = Self::default();
        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            if arg == "--hydrate" {
                args.hydrate = true;
            } else if arg == "--props" {
                args.props = iter.next();
            } else if arg.starts_with("--") {
                log::warn!("Ignoring unknown flag {}", arg);
            } else if args.path.is_none() {
                args.path = Some(arg);
            } else {
                log::warn!("Ignoring extra argument {}", arg);
            }
        }
        args
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(args)) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> RuntimeResult<()> {
    let config = RuntimeConfig::load()?;
    let props = match &args.props {
        Some(text) => parse_props(text)?,
        None => Props::new(),
    };
    let path = args.path.as_deref().unwrap_or("/");

    let runtime = Runtime::new(config);
    log::info!("Rendering {}", path);
    let response = runtime.respond(path, props).await?;

    println!("content-type: {}", response.content_type);
    println!();
    println!("{}", response.body);

    if args.hydrate {
        let tree = runtime.hydrate(&response).await?;
        log::info!(
            "Hydrated {} elements ({} client modules loaded)",
            tree.element_count(),
            runtime.resolver().modules().load_count()
        );
        for path in runtime.resolver().modules().cached_paths() {
            log::debug!("  {}", path);
        }
    }

    Ok(())
}
