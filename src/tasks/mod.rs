pub mod editor;

use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiError, Page, Project, Task, TaskInput, TaskStatus, TrackerApi};
use crate::query::{Query, QueryCache, keys};

/// Optional restrictions on the task list. Each distinct filter is its own
/// cache entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TaskFilter {
    pub project_id: Option<i64>,
    pub status: Option<TaskStatus>,
}

/// Raw `/tasks` query string. Empty values mean "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct TaskFilterParams {
    pub project_id: Option<String>,
    pub status: Option<String>,
}

impl TaskFilterParams {
    pub fn to_filter(&self) -> TaskFilter {
        TaskFilter {
            project_id: self
                .project_id
                .as_deref()
                .and_then(|v| v.trim().parse::<i64>().ok()),
            status: self.status.as_deref().and_then(TaskStatus::parse),
        }
    }
}

/// One kanban column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

/// Partition tasks into the three fixed columns, keeping fetch order inside
/// each column. Tasks whose status is not one of the three columns appear in
/// none of them.
pub fn group_by_status(tasks: &[Task]) -> Vec<Column> {
    TaskStatus::COLUMNS
        .iter()
        .map(|&status| Column {
            status,
            tasks: tasks.iter().filter(|t| t.status == status).cloned().collect(),
        })
        .collect()
}

/// Data needed to render the board.
#[derive(Debug, Clone, Default)]
pub struct BoardData {
    pub tasks: Vec<Task>,
    pub total: i64,
    pub projects: Vec<Project>,
}

impl BoardData {
    pub fn columns(&self) -> Vec<Column> {
        group_by_status(&self.tasks)
    }

    pub fn project_name(&self, project_id: i64) -> Option<&str> {
        self.projects
            .iter()
            .find(|p| p.id == project_id)
            .map(|p| p.name.as_str())
    }

    pub fn find_task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

/// Task reads and mutations for one signed-in user. Every successful
/// mutation invalidates all cached task lists for the user; nothing is
/// patched in place.
pub struct TaskBoard<'a> {
    api: &'a Arc<dyn TrackerApi>,
    cache: &'a QueryCache,
    scope: &'a str,
    token: &'a str,
}

impl<'a> TaskBoard<'a> {
    pub fn new(
        api: &'a Arc<dyn TrackerApi>,
        cache: &'a QueryCache,
        scope: &'a str,
        token: &'a str,
    ) -> Self {
        Self { api, cache, scope, token }
    }

    pub async fn load(&self, filter: &TaskFilter) -> Result<BoardData, ApiError> {
        let tasks = self.cache.fetch(Query::new(keys::tasks(self.scope, filter)), || {
            self.api.list_tasks(self.token, filter)
        });
        let projects = self
            .cache
            .fetch(Query::new(keys::projects(self.scope)), || self.api.list_projects(self.token));
        let (tasks, projects): (Result<Option<Page<Task>>, _>, Result<Option<Page<Project>>, _>) =
            futures::join!(tasks, projects);

        let tasks = tasks?.unwrap_or_default();
        let projects = projects?.unwrap_or_default();
        Ok(BoardData { tasks: tasks.items, total: tasks.total, projects: projects.items })
    }

    pub async fn create(&self, input: &TaskInput) -> Result<Task, ApiError> {
        let task = self.api.create_task(self.token, input).await?;
        self.invalidate();
        log::info!("Created task {} in project {}", task.id, task.project_id);
        Ok(task)
    }

    pub async fn update(&self, id: i64, input: &TaskInput) -> Result<Task, ApiError> {
        let task = self.api.update_task(self.token, id, input).await?;
        self.invalidate();
        log::info!("Updated task {id}");
        Ok(task)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.api.delete_task(self.token, id).await?;
        self.invalidate();
        log::info!("Deleted task {id}");
        Ok(())
    }

    pub async fn change_status(&self, id: i64, status: TaskStatus) -> Result<Task, ApiError> {
        let task = self.api.update_task_status(self.token, id, status).await?;
        self.invalidate();
        log::info!("Moved task {id} to {}", status.as_str());
        Ok(task)
    }

    fn invalidate(&self) {
        self.cache.invalidate(&keys::tasks_root(self.scope));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: i64, status: TaskStatus) -> Task {
        Task {
            id,
            name: format!("Task {id}"),
            description: None,
            project_id: 1,
            status,
        }
    }

    #[test]
    fn grouping_preserves_fetch_order() {
        let tasks = vec![
            task(1, TaskStatus::Done),
            task(2, TaskStatus::Todo),
            task(3, TaskStatus::Done),
            task(4, TaskStatus::InProgress),
            task(5, TaskStatus::Todo),
        ];
        let columns = group_by_status(&tasks);
        let ids: Vec<Vec<i64>> = columns
            .iter()
            .map(|c| c.tasks.iter().map(|t| t.id).collect())
            .collect();
        assert_eq!(ids, vec![vec![2, 5], vec![4], vec![1, 3]]);
        assert_eq!(columns[0].status, TaskStatus::Todo);
        assert_eq!(columns[2].status, TaskStatus::Done);
    }

    #[test]
    fn grouping_empty_list_yields_three_empty_columns() {
        let columns = group_by_status(&[]);
        assert_eq!(columns.len(), 3);
        assert!(columns.iter().all(|c| c.tasks.is_empty()));
    }

    #[test]
    fn filter_params_ignore_blank_and_unknown_values() {
        let params = TaskFilterParams { project_id: Some("".into()), status: Some("ARCHIVED".into()) };
        assert_eq!(params.to_filter(), TaskFilter::default());

        let params = TaskFilterParams { project_id: Some("4".into()), status: Some("DONE".into()) };
        assert_eq!(
            params.to_filter(),
            TaskFilter { project_id: Some(4), status: Some(TaskStatus::Done) }
        );
    }
}
