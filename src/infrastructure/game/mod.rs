//! Game directory infrastructure

mod postgres_directory;

pub use postgres_directory::PostgresGameDirectory;
