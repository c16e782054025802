//! Ingestion - dedupes, classifies and stores a batch of chat-log messages.
//!
//! Membership is re-derived from the `activities` table on every call, so a
//! backfill that overlaps already stored history inserts nothing twice. The
//! whole batch is written in one database transaction.

use crate::{
    core::classifier::ActivityParser,
    entities::{Activity, activity},
    errors::Result,
    models::{ParsedActivity, RawMessage},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use std::collections::HashSet;
use tracing::info;

/// Outcome of one ingestion call.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    /// Messages handed in
    pub received: usize,
    /// Messages dropped as repeats (within the batch or already stored)
    pub duplicates: usize,
    /// Newly stored activities, in arrival order
    pub inserted: Vec<ParsedActivity>,
}

/// Dedupes `messages` against the batch itself and stored history, then
/// classifies and stores what is new.
pub async fn ingest_messages(
    db: &DatabaseConnection,
    parser: &ActivityParser,
    messages: Vec<RawMessage>,
) -> Result<IngestSummary> {
    let received = messages.len();
    let fresh = parser.dedupe_against(messages, &HashSet::new());

    let candidate_keys: Vec<String> = fresh.iter().map(|f| f.fingerprint.clone()).collect();
    let stored: HashSet<String> = if candidate_keys.is_empty() {
        HashSet::new()
    } else {
        Activity::find()
            .select_only()
            .column(activity::Column::Fingerprint)
            .filter(activity::Column::Fingerprint.is_in(candidate_keys))
            .into_tuple::<String>()
            .all(db)
            .await?
            .into_iter()
            .collect()
    };

    let txn = db.begin().await?;
    let mut inserted = Vec::new();

    for entry in fresh {
        if stored.contains(&entry.fingerprint) {
            continue;
        }

        let parsed = parser.classify(&entry.message);
        to_active_model(&parsed, entry.fingerprint).insert(&txn).await?;
        inserted.push(parsed);
    }

    txn.commit().await?;

    let duplicates = received - inserted.len();
    info!(
        received,
        inserted = inserted.len(),
        duplicates,
        "ingested message batch"
    );

    Ok(IngestSummary {
        received,
        duplicates,
        inserted,
    })
}

/// Most recent stored activities, newest first.
pub async fn get_recent_activities(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<Vec<activity::Model>> {
    Activity::find()
        .order_by_desc(activity::Column::Timestamp)
        .order_by_desc(activity::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

fn to_active_model(parsed: &ParsedActivity, fingerprint: String) -> activity::ActiveModel {
    activity::ActiveModel {
        message_id: Set(parsed.id.clone()),
        fingerprint: Set(fingerprint),
        author: Set(parsed.author.clone()),
        timestamp: Set(parsed.timestamp),
        content: Set(parsed.content.clone()),
        kind: Set(parsed.kind.map(|kind| kind.as_str().to_string())),
        category: Set(parsed.category.as_str().to_string()),
        item: Set(parsed.item.clone()),
        quantity: Set(parsed.quantity.map(i64::from)),
        amount: Set(parsed.amount),
        description: Set(parsed.description.clone()),
        display_text: Set(parsed.display_text.clone()),
        parse_success: Set(parsed.parse_success),
        confidence: Set(parsed.confidence.as_str().to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::models::ActivityType;
    use crate::test_utils::*;

    fn batch() -> Vec<RawMessage> {
        vec![
            message(
                "1",
                "bridge",
                "INSERIR ITEM\nAutor: Joao\nItem adicionado: cow_female x 3\nData: 15/03/2024, 14:30:25",
            ),
            message(
                "2",
                "bridge",
                "INSERIR ITEM\nAutor: Joao\nItem adicionado: cow_female x 3\nData: 15/03/2024, 14:30:25",
            ),
            message(
                "3",
                "bridge",
                "CAIXA ORGANIZAÇÃO - DEPÓSITO\nAutor: Maria\nValor depositado: $100\nData: 15/03/2024, 14:31:00",
            ),
        ]
    }

    #[tokio::test]
    async fn test_ingest_stores_unique_activities() -> Result<()> {
        let db = setup_test_db().await?;
        let parser = test_parser();

        let summary = ingest_messages(&db, &parser, batch()).await?;
        assert_eq!(summary.received, 3);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.inserted.len(), 2);
        assert_eq!(summary.inserted[0].kind, Some(ActivityType::Adicionar));
        assert_eq!(summary.inserted[1].kind, Some(ActivityType::Deposito));

        let stored = get_recent_activities(&db, 10).await?;
        assert_eq!(stored.len(), 2);
        let vaca = stored.iter().find(|a| a.message_id == "1").unwrap();
        assert_eq!(vaca.item.as_deref(), Some("Vaca"));
        assert_eq!(vaca.quantity, Some(3));
        assert_eq!(vaca.category, "inventario");
        assert_eq!(vaca.confidence, "high");

        Ok(())
    }

    #[tokio::test]
    async fn test_overlapping_backfill_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let parser = test_parser();

        ingest_messages(&db, &parser, batch()).await?;

        let mut backfill = batch();
        backfill.push(message(
            "4",
            "Pedro",
            "Pedro vendeu 7 animais no matadouro por $350 - 15/03/2024, 15:00:00",
        ));
        let summary = ingest_messages(&db, &parser, backfill).await?;

        assert_eq!(summary.received, 4);
        assert_eq!(summary.inserted.len(), 1);
        assert_eq!(summary.inserted[0].id, "4");
        assert_eq!(get_recent_activities(&db, 10).await?.len(), 3);

        let again = ingest_messages(&db, &parser, batch()).await?;
        assert!(again.inserted.is_empty());
        assert_eq!(again.duplicates, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_ingest_stores_fallback_activities() -> Result<()> {
        let db = setup_test_db().await?;
        let parser = test_parser();

        let summary =
            ingest_messages(&db, &parser, vec![message("9", "bridge", "bom dia fazenda")]).await?;
        assert_eq!(summary.inserted.len(), 1);
        assert!(!summary.inserted[0].parse_success);

        let stored = get_recent_activities(&db, 10).await?;
        assert_eq!(stored[0].kind, None);
        assert_eq!(stored[0].category, "sistema");
        assert_eq!(stored[0].confidence, "low");
        assert_eq!(stored[0].display_text, "bom dia fazenda");

        Ok(())
    }

    #[tokio::test]
    async fn test_distinct_unrecognized_lines_from_one_poster_are_all_stored() -> Result<()> {
        let db = setup_test_db().await?;
        let parser = test_parser();

        let first = ingest_messages(
            &db,
            &parser,
            vec![message("a", "Unknown", "Joao abriu o bau da fazenda")],
        )
        .await?;
        let second = ingest_messages(
            &db,
            &parser,
            vec![message("b", "Unknown", "Maria fechou o portao do curral")],
        )
        .await?;
        assert_eq!(first.inserted.len(), 1);
        assert_eq!(second.inserted.len(), 1);

        let redelivered = ingest_messages(
            &db,
            &parser,
            vec![message("c", "Unknown", "Joao abriu o bau da fazenda")],
        )
        .await?;
        assert!(redelivered.inserted.is_empty());
        assert_eq!(get_recent_activities(&db, 10).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_ingest_empty_batch() -> Result<()> {
        let db = setup_test_db().await?;
        let summary = ingest_messages(&db, &test_parser(), Vec::new()).await?;
        assert_eq!(summary.received, 0);
        assert!(summary.inserted.is_empty());
        Ok(())
    }
}
