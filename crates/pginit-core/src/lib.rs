pub mod logging;
pub mod settings;

// Core modules
pub mod config_store;
pub mod connection_string;
pub mod db_url;
pub mod engine_settings;
pub mod initializer;
pub mod sql;
pub mod transcode;
