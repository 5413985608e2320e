pub mod analysis;
pub mod coordinator;
pub mod event_cache;
pub mod events_api;
pub mod export;
pub mod fake_source;
pub mod http_client;
pub mod insight;
pub mod model;
pub mod reconcile;
pub mod scout_api;
pub mod store;
pub mod team_directory;
