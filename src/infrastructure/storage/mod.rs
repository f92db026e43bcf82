//! Storage infrastructure - connection pooling, migrations, in-memory store

mod in_memory;
pub mod migrations;
mod postgres;

pub use in_memory::InMemoryRegistry;
pub use migrations::{registry_migrations, Migration, PostgresMigrator};
pub use postgres::PostgresConfig;
