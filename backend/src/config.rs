/// Command line and environment configuration for the demo binary
use crate::infrastructure::persistence::SqliteProductRepository;
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fmt;
use std::path::PathBuf;

const IN_MEMORY: &str = ":memory:";
const DEFAULT_PRODUCT_NAME: &str = "Test";
const DEFAULT_PRODUCT_DESCRIPTION: &str = "A product to test";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Where products are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    InMemory,
    File(PathBuf),
}

impl fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseLocation::InMemory => write!(f, "{}", IN_MEMORY),
            DatabaseLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseLocation,
    pub product_name: String,
    pub product_description: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            database,
            name,
            description,
            log_level,
        } = args;

        let database = match database {
            Some(path) if path.as_os_str() == IN_MEMORY => DatabaseLocation::InMemory,
            Some(path) if path.as_os_str().is_empty() => {
                bail!("database path cannot be empty")
            }
            Some(path) => DatabaseLocation::File(path),
            None => DatabaseLocation::InMemory,
        };

        if name.trim().is_empty() {
            bail!("product name cannot be empty");
        }

        Ok(Self {
            database,
            product_name: name,
            product_description: description,
            log_level,
        })
    }

    /// Open the SQLite repository this configuration points at
    pub fn open_repository(&self) -> Result<SqliteProductRepository> {
        match &self.database {
            DatabaseLocation::InMemory => SqliteProductRepository::new_in_memory()
                .context("failed to open in-memory database"),
            DatabaseLocation::File(path) => SqliteProductRepository::new_with_path(path)
                .with_context(|| format!("failed to open database {}", path.display())),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseLocation::InMemory,
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            product_description: DEFAULT_PRODUCT_DESCRIPTION.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "product-backlog",
    version,
    about = "Create a product for a fresh tenant, read it back and print it"
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "PATH",
        env = "PRODUCT_BACKLOG_DATABASE",
        help = "SQLite database file (defaults to an in-memory database)"
    )]
    pub database: Option<PathBuf>,

    #[arg(long, value_name = "NAME", default_value = DEFAULT_PRODUCT_NAME, help = "Name of the product to create")]
    pub name: String,

    #[arg(
        long,
        value_name = "TEXT",
        default_value = DEFAULT_PRODUCT_DESCRIPTION,
        help = "Description of the product to create"
    )]
    pub description: String,

    #[arg(
        long,
        value_name = "FILTER",
        env = "PRODUCT_BACKLOG_LOG",
        default_value = DEFAULT_LOG_LEVEL,
        help = "Log filter used when RUST_LOG is not set"
    )]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        let cli = CliArgs::try_parse_from(std::iter::once("product-backlog").chain(args.iter().copied()))
            .unwrap();
        AppConfig::from_args(cli).unwrap()
    }

    #[test]
    fn test_explicit_arguments() {
        let config = parse(&["--database", "/tmp/products.db", "--name", "IT", "--description", "IT Product"]);

        assert_eq!(
            config.database,
            DatabaseLocation::File(PathBuf::from("/tmp/products.db"))
        );
        assert_eq!(config.product_name, "IT");
        assert_eq!(config.product_description, "IT Product");
    }

    #[test]
    fn test_memory_marker() {
        let config = parse(&["--database", ":memory:"]);
        assert_eq!(config.database, DatabaseLocation::InMemory);
        assert_eq!(config.database.to_string(), ":memory:");
    }

    #[test]
    fn test_empty_name_rejected() {
        let cli = CliArgs::try_parse_from(["product-backlog", "--name", " "]).unwrap();
        assert!(AppConfig::from_args(cli).is_err());
    }

    #[test]
    fn test_default_config_opens_in_memory_repository() {
        let config = AppConfig::default();
        assert_eq!(config.product_name, "Test");
        assert!(config.open_repository().is_ok());
    }
}
