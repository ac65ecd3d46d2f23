pub mod books;

use library_kernel::{settings::Settings, ModuleRegistry};

/// Register all project modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    registry.register(books::create_module(&settings.books))?;
    Ok(())
}
