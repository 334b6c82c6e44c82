use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{TaskStats, TaskStatus};
use crate::store::TaskStore;

/// Produces the zero-filled per-status count for one owner. The grouped
/// counts come from a single store query, so the three counts are one
/// consistent snapshot and always sum to `total`.
pub struct StatsAggregator {
    store: Arc<dyn TaskStore>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn task_stats(&self, owner_id: Uuid) -> Result<TaskStats, AppError> {
        let counts = self.store.count_by_status(owner_id).await?;

        let mut stats = counts
            .into_iter()
            .fold(TaskStats::default(), |mut stats, (status, count)| {
                match status {
                    TaskStatus::Todo => stats.todo = count,
                    TaskStatus::InProgress => stats.in_progress = count,
                    TaskStatus::Done => stats.done = count,
                }
                stats
            });
        stats.total = stats.todo + stats.in_progress + stats.done;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTask, Task};
    use crate::store::{MemoryTaskStore, TaskStore};
    use pretty_assertions::assert_eq;

    async fn seed(store: &MemoryTaskStore, owner: Uuid, status: TaskStatus, n: usize) {
        for i in 0..n {
            store
                .insert(Task::new(
                    NewTask {
                        title: format!("{} task {}", status.as_str(), i),
                        description: String::new(),
                        status,
                    },
                    owner,
                ))
                .await
                .unwrap();
        }
    }

    #[actix_rt::test]
    async fn test_zero_fill_for_empty_owner() {
        let store = Arc::new(MemoryTaskStore::default());
        let aggregator = StatsAggregator::new(store);

        let stats = aggregator.task_stats(Uuid::new_v4()).await.unwrap();
        assert_eq!(stats, TaskStats::default());
    }

    #[actix_rt::test]
    async fn test_counts_sum_to_total_and_absent_statuses_are_zero() {
        let store = Arc::new(MemoryTaskStore::default());
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        seed(&store, owner, TaskStatus::Todo, 3).await;
        seed(&store, owner, TaskStatus::Done, 2).await;
        seed(&store, other, TaskStatus::InProgress, 4).await;

        let aggregator = StatsAggregator::new(store);
        let stats = aggregator.task_stats(owner).await.unwrap();

        assert_eq!(stats.todo, 3);
        assert_eq!(stats.in_progress, 0);
        assert_eq!(stats.done, 2);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.todo + stats.in_progress + stats.done, stats.total);
    }

    #[actix_rt::test]
    async fn test_stats_json_shape() {
        let store = Arc::new(MemoryTaskStore::default());
        let owner = Uuid::new_v4();
        seed(&store, owner, TaskStatus::InProgress, 1).await;

        let stats = StatsAggregator::new(store).task_stats(owner).await.unwrap();
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"TODO": 0, "IN_PROGRESS": 1, "DONE": 0, "total": 1})
        );
    }
}
