pub mod books;

use std::sync::Arc;

use bookclub_db::DocumentStore;
use bookclub_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    store: &Arc<dyn DocumentStore>,
) -> anyhow::Result<()> {
    registry.register(books::create_module(store.clone()))
}
