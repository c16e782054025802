//! General Discord commands - ping and help.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ajuda(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Farm Ledger - Ajuda**\n\
        Comandos disponíveis:\n\n\
        **Pagamentos**\n\
        • `/pendentes <jogador>` - Lista os recibos aprovados e ainda não pagos.\n\
        • `/pagar <jogador>` - Paga todos os recibos aprovados do jogador.\n\n\
        **Registros**\n\
        • `/classificar <texto>` - Mostra como uma linha de log seria classificada.\n\n\
        **Utilidades**\n\
        • `/ping` - Verifica se o bot está respondendo.\n\
        • `/ajuda` - Mostra esta mensagem.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
