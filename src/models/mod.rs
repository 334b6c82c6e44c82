pub mod identity;
pub mod task;

pub use identity::{Identity, IdentityRecord};
pub use task::{
    NewTask, Pagination, SortField, SortOrder, Task, TaskDraft, TaskFilter, TaskListParams,
    TaskListQuery, TaskPage, TaskPatch, TaskSort, TaskStats, TaskStatus,
};
