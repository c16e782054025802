/// Database connection and table creation
pub mod database;

/// Parser tunables (item-name table, display limit) loaded from config.toml
pub mod parser;
