//! Payout Discord commands - `pagar` and `pendentes`.
//!
//! Both go through the core receipt and payout modules; the bot only formats
//! the replies.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            payout::{PayoutOutcome, format_payout_summary},
            receipt,
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Pays every approved, unpaid receipt of a worker.
    ///
    /// The command author is recorded as the payer. Receipts whose save fails
    /// stay unpaid and are listed in the reply.
    #[poise::command(slash_command, prefix_command)]
    pub async fn pagar(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Jogador a ser pago"]
        #[autocomplete = "autocomplete::autocomplete_pending_player"]
        jogador: String,
    ) -> Result<()> {
        let paid_by = ctx.author().name.clone();

        match ctx.data().reconciler.pay_worker(&jogador, &paid_by).await? {
            PayoutOutcome::NoEligibleReceipts { player_name } => {
                ctx.say(format!(
                    "ℹ️ Nenhum recibo aprovado pendente para '{player_name}'."
                ))
                .await?;
            }
            PayoutOutcome::Completed(batch) => {
                let prefix = if batch.is_partial() { "⚠️" } else { "✅" };
                ctx.say(format!(
                    "{prefix} ```\n{}```",
                    format_payout_summary(&batch)?
                ))
                .await?;
            }
        }

        Ok(())
    }

    /// Lists the approved, unpaid receipts of a worker and their total.
    #[poise::command(slash_command, prefix_command)]
    pub async fn pendentes(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Jogador"]
        #[autocomplete = "autocomplete::autocomplete_pending_player"]
        jogador: String,
    ) -> Result<()> {
        let jogador = jogador.trim();
        let receipts = receipt::get_unpaid_approved_receipts(ctx.data().database(), jogador).await?;

        if receipts.is_empty() {
            ctx.say(format!("ℹ️ Nenhum recibo pendente para '{jogador}'."))
                .await?;
            return Ok(());
        }

        let total: f64 = receipts.iter().map(|r| r.player_payment).sum();
        let mut reply = format!(
            "**Pendentes de {jogador}** - {} recibo(s) - Total: ${total:.2}\n",
            receipts.len()
        );
        for r in &receipts {
            writeln!(
                &mut reply,
                "• `{}` {} {}x - ${:.2}",
                r.receipt_id, r.service_type, r.quantity, r.player_payment
            )?;
        }

        ctx.say(reply).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
