//! Activity Discord commands - preview how a log line is classified.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
        models::RawMessage,
    };
    use std::fmt::Write;

    /// Shows how a chat-log line would be classified, without storing it.
    #[poise::command(slash_command, prefix_command)]
    pub async fn classificar(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Linha de log a classificar"]
        #[rest]
        texto: String,
    ) -> Result<()> {
        let message = RawMessage::new(
            ctx.id().to_string(),
            ctx.author().name.clone(),
            texto,
            chrono::Utc::now(),
        );
        let parsed = ctx.data().parser.classify(&message);

        let tipo = parsed.kind.map_or("-", |kind| kind.as_str());
        let mut reply = format!(
            "**{}**\nTipo: `{tipo}` | Categoria: `{}` | Confiança: `{}`\nAutor: {}",
            parsed.display_text, parsed.category, parsed.confidence, parsed.author
        );
        if let Some(item) = &parsed.item {
            write!(&mut reply, "\nItem: {item}")?;
        }
        if let Some(quantity) = parsed.quantity {
            write!(&mut reply, "\nQuantidade: {quantity}")?;
        }
        if let Some(amount) = parsed.amount {
            write!(&mut reply, "\nValor: ${amount:.2}")?;
        }

        ctx.say(reply).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
