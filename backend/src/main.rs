//! Demo runner: create a product for a fresh tenant, read it back, print it

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use product_backlog::application::{ProductView, ProductsService};
use product_backlog::config::{AppConfig, CliArgs};
use product_backlog::domain::{ProductOwnerId, TenantId};
use product_backlog::logging;
use std::process::ExitCode;
use tracing::info;

fn main() -> ExitCode {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run() -> Result<()> {
    let config = AppConfig::from_args(CliArgs::parse())?;
    logging::init(&config.log_level)?;
    info!(database = %config.database, "Opening product repository");

    let service = ProductsService::new(config.open_repository()?);

    let tenant_id = TenantId::generate();
    let created = service
        .create(
            &tenant_id,
            &ProductOwnerId::generate(),
            &config.product_name,
            &config.product_description,
        )
        .context("failed to create product")?;

    let product = service
        .get(&tenant_id, &created.product_id())
        .context("failed to read product back")?
        .ok_or_else(|| anyhow!("product {} missing after save", created.key()))?;

    println!("{}", serde_json::to_string_pretty(&ProductView::from(&product))?);
    Ok(())
}
