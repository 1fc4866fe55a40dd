pub mod catalog;
pub mod config;
pub mod dock;
pub mod fake_feed;
pub mod feed;
pub mod http_cache;
pub mod http_client;
pub mod logging;
pub mod refresh;
pub mod scoreboard_fetch;
pub mod state;
pub mod timer;
