/// Database access layer
///
/// - `pool` - connection pool construction and health probing
/// - `migrations` - embedded schema migrations applied at startup
pub mod migrations;
pub mod pool;

// Re-export the types callers touch most often
pub use migrations::run_migrations;
pub use pool::{create_pool, DatabaseConfig};
