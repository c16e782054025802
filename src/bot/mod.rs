//! Bot layer - Discord-specific interface and command handlers
//!
//! This module exposes payouts and log-line classification over Discord slash
//! commands, plus the autocomplete handlers and the shared bot context.

/// Discord command implementations (payout, activity, general)
pub mod commands;
/// Discord interaction handlers (autocomplete)
pub mod handlers;

use crate::{
    core::{
        ActivityParser,
        payout::ReceiptReconciler,
        receipt::DbReceiptStore,
    },
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Compiled log-line parser
    pub parser: ActivityParser,
    /// Payout reconciler; owns the database connection
    pub reconciler: ReceiptReconciler<DbReceiptStore>,
}

impl BotData {
    /// Creates the bot context from a parser and a database connection.
    #[must_use]
    pub fn new(parser: ActivityParser, database: DatabaseConnection) -> Self {
        Self {
            parser,
            reconciler: ReceiptReconciler::new(DbReceiptStore::new(database)),
        }
    }

    /// Database connection for queries outside the reconciler.
    #[must_use]
    pub const fn database(&self) -> &DatabaseConnection {
        self.reconciler.store().connection()
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("❌ Ocorreu um erro: {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Gateway intents requested at login.
///
/// There is no message listener: slash commands need only `GUILDS`, and prefix
/// commands are served in DMs, which carry content without the privileged
/// `MESSAGE_CONTENT` intent.
#[must_use]
pub fn gateway_intents() -> serenity::GatewayIntents {
    serenity::GatewayIntents::GUILDS | serenity::GatewayIntents::DIRECT_MESSAGES
}

/// Builds the poise framework and runs the Discord client until it stops.
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::ajuda(),
                commands::pagar(),
                commands::pendentes(),
                commands::classificar(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, gateway_intents())
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;

    Ok(())
}

pub use commands::*;
pub use handlers::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_intents_are_not_privileged() {
        let intents = gateway_intents();
        assert!(!intents.contains(serenity::GatewayIntents::MESSAGE_CONTENT));
        assert!(!intents.contains(serenity::GatewayIntents::GUILD_MESSAGES));
        assert!(serenity::GatewayIntents::non_privileged().contains(intents));
    }
}
