use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::database;

#[derive(Args)]
pub struct InitDbArgs {
    #[arg(long, help = "Database URL (defaults to DATABASE_URL)")]
    pub database_url: Option<String>,
}

/// Run the same schema reconciliation the server performs at startup.
/// Useful for provisioning a database before the first deploy.
pub async fn handle(args: InitDbArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = match args.database_url {
        Some(url) => url,
        None => std::env::var("DATABASE_URL")
            .context("No database given; pass --database-url or set DATABASE_URL")?,
    };

    let pool = database::connect(&url, 1)
        .await
        .context("Failed to connect to database")?;
    database::schema::init(&pool).await?;

    match output_format {
        OutputFormat::Json => println!("{}", json!({ "status": "ok" })),
        OutputFormat::Text => println!("Schema is up to date"),
    }

    Ok(())
}
