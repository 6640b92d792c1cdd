use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::auth;
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(help = "Subject (user id) to mint the token for")]
    pub subject: String,

    #[arg(long, help = "HS256 signing secret (defaults to FLASHCARD_JWT_SECRET)")]
    pub secret: Option<String>,

    #[arg(long, default_value_t = 24, help = "Token lifetime in hours")]
    pub ttl_hours: i64,
}

pub async fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let secret = match args.secret {
        Some(secret) => secret,
        None => std::env::var("FLASHCARD_JWT_SECRET")
            .context("No secret given; pass --secret or set FLASHCARD_JWT_SECRET")?,
    };

    let token = auth::issue_hs256(&secret, &args.subject, args.ttl_hours)?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": token, "subject": args.subject, "ttl_hours": args.ttl_hours })
        ),
        OutputFormat::Text => println!("{}", token),
    }

    Ok(())
}
