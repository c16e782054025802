use dotenvy::dotenv;
use farm_ledger::{
    bot::{self, BotData},
    config::{database, parser},
    core::ActivityParser,
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables can also be set externally
    dotenv().ok();

    // 3. Parser configuration (item table, display limit)
    let parser_config = parser::load_default_config()
        .inspect_err(|e| error!("Failed to load parser configuration: {}", e))?;
    let activity_parser = ActivityParser::new(&parser_config)?;
    info!(
        items = parser_config.items.len(),
        display_limit = parser_config.display_limit,
        "Parser configured"
    );

    // 4. Database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ready"))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(activity_parser, db)).await
}
