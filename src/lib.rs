//! Library API
//!
//! An in-memory book collection served over HTTP. The `books` module owns the
//! store and its routes; the kernel and HTTP crates supply settings, module
//! lifecycle and the server.

pub mod modules;
pub mod utils;

use std::future::Future;

use anyhow::Context;
use library_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Re-export commonly used types
pub use modules::*;

/// Build a registry holding every project module.
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry, settings).context("failed to register modules")?;
    Ok(registry)
}

/// Run the application until `shutdown` resolves: initialize and start every
/// module, serve HTTP, then stop modules in reverse order.
pub async fn run<F>(settings: Settings, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let registry = build_registry(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = library_http::start_server(&registry, &settings, shutdown).await;
    let stopped = registry.stop_modules().await;

    served?;
    stopped
}
