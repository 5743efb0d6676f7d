use serde::Serialize;
use tracing::debug;

use crate::models::GameRecord;
use crate::storage::{Storage, StorageError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Upsert each record by title: update first, insert when no row matched.
///
/// Records are written one at a time without a surrounding transaction, so a failure
/// leaves every earlier record of the batch committed.
pub async fn reconcile(
    storage: &dyn Storage,
    games: &[GameRecord],
) -> Result<ReconcileSummary, StorageError> {
    let mut summary = ReconcileSummary::default();

    for game in games {
        if storage.update_game(game).await? == 0 {
            storage.insert_game(game).await?;
            debug!(title = %game.title, "Inserted");
            summary.inserted += 1;
        } else {
            debug!(title = %game.title, "Updated");
            summary.updated += 1;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Price;
    use crate::storage::{GameFilter, SqliteStorage};
    use pretty_assertions::assert_eq;

    fn game(title: &str, cents: i64) -> GameRecord {
        GameRecord {
            title: title.to_string(),
            price: Price(cents),
            review_label: "Positivas".to_string(),
            review_score: 8,
            review_percent_positive: 75,
            review_count: 42,
        }
    }

    async fn storage() -> SqliteStorage {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.ensure_schema().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn second_run_updates_every_row() {
        let storage = storage().await;
        let batch = vec![game("A", 100), game("B", 200), game("C", 300)];

        let first = reconcile(&storage, &batch).await.unwrap();
        assert_eq!(first, ReconcileSummary { inserted: 3, updated: 0 });

        let second = reconcile(&storage, &batch).await.unwrap();
        assert_eq!(second, ReconcileSummary { inserted: 0, updated: 3 });

        assert_eq!(storage.count_games().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let storage = storage().await;
        reconcile(&storage, &[game("A", 100)]).await.unwrap();
        reconcile(&storage, &[game("A", 4999), game("B", 10)]).await.unwrap();

        let rows = storage.query_games(&GameFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].game.price, Price(4999));
    }

    #[tokio::test]
    async fn duplicate_titles_in_one_batch_keep_one_row() {
        let storage = storage().await;
        let summary = reconcile(&storage, &[game("A", 100), game("A", 150)]).await.unwrap();

        assert_eq!(summary, ReconcileSummary { inserted: 1, updated: 1 });
        assert_eq!(storage.count_games().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_batch_touches_nothing() {
        let storage = storage().await;
        let summary = reconcile(&storage, &[]).await.unwrap();
        assert_eq!(summary, ReconcileSummary::default());
    }
}
