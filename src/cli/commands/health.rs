use std::time::Duration;

use anyhow::Context;
use clap::Args;
use serde_json::{json, Value};

use crate::cli::OutputFormat;

#[derive(Args)]
pub struct HealthArgs {
    #[arg(
        long,
        default_value = "http://localhost:8000",
        help = "Base URL of the API server"
    )]
    pub url: String,
}

pub async fn handle(args: HealthArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let endpoint = format!("{}/health", args.url.trim_end_matches('/'));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let response = client
        .get(&endpoint)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", endpoint))?;

    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "http_status": status.as_u16(), "body": body })
        ),
        OutputFormat::Text => {
            println!("{} -> {}", endpoint, status);
            if let Some(db) = body.get("database").or_else(|| body.get("database_error")) {
                println!("database: {}", db);
            }
        }
    }

    if !status.is_success() {
        anyhow::bail!("Server reported {}", status);
    }

    Ok(())
}
