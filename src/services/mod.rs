pub mod credentials;
pub mod providers;
pub mod stats;
pub mod watchlist;

pub use credentials::CredentialService;
pub use providers::{DisabledProvider, MediaProvider, TmdbProvider};
pub use stats::compute_stats;
pub use watchlist::WatchlistService;
