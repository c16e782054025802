//! Autocomplete handlers for Discord slash command parameters.

use crate::{bot::BotData, core::receipt, errors::Error};

/// Suggests workers that have approved, unpaid receipts.
///
/// Matches the partial input case-insensitively and returns at most 25 names,
/// the Discord autocomplete limit. Database failures yield no suggestions.
pub async fn autocomplete_pending_player(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(players) = receipt::get_players_with_pending_payments(ctx.data().database()).await
    else {
        return Vec::new();
    };

    filter_names(players, partial)
}

fn filter_names(names: Vec<String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .take(25)
        .collect()
}
