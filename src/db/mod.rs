pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::{MemoryAccountStore, MemoryWatchlistStore};
pub use postgres::{create_pool, run_migrations, PgAccountStore, PgWatchlistStore};
pub use store::{AccountStore, WatchlistStore};
