//! Registration ledger infrastructure

mod postgres_ledger;

pub(crate) use postgres_ledger::enroll_in_tx;
pub use postgres_ledger::PostgresRegistrationLedger;
