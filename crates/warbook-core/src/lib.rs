// Configuration, persistence and stats-feed import for warbook.

pub mod config;
pub mod db;
pub mod import;

pub use config::{Config, ConfigError, DataPaths, ReportConfig};
pub use db::{Database, PlayerFilter, StoredPlayer};
pub use import::{import_all, ImportError, ImportSummary};
