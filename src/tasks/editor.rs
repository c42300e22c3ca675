use serde::Deserialize;

use crate::api::{Project, Task, TaskInput, TaskStatus};
use crate::auth::validate;

pub const NAME_MAX_LEN: usize = 200;
pub const DESCRIPTION_MAX_LEN: usize = 2000;

/// Field values of the task editor.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    pub project_id: Option<i64>,
    pub status: TaskStatus,
}

impl TaskDraft {
    /// Blank draft: empty text, first available project, `TODO`.
    pub fn blank(projects: &[Project]) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            project_id: projects.first().map(|p| p.id),
            status: TaskStatus::Todo,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            description: task.description.clone().unwrap_or_default(),
            project_id: Some(task.project_id),
            status: task.status,
        }
    }

    /// Check the draft locally and build the request body. Nothing is sent
    /// when this returns errors.
    pub fn validate(&self) -> Result<TaskInput, Vec<String>> {
        let mut errors = vec![];
        errors.extend(validate::validate_required(&self.name, "Task name", NAME_MAX_LEN));
        errors.extend(validate::validate_optional(
            &self.description,
            "Description",
            DESCRIPTION_MAX_LEN,
        ));
        if self.project_id.is_none() {
            errors.push("Please select a project".to_string());
        }
        if self.status == TaskStatus::Unrecognized {
            errors.push("Please select a status".to_string());
        }

        match (errors.is_empty(), self.project_id) {
            (true, Some(project_id)) => {
                let description = self.description.trim();
                Ok(TaskInput {
                    name: self.name.trim().to_string(),
                    description: (!description.is_empty()).then(|| description.to_string()),
                    project_id,
                    status: self.status,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Submitted editor form.
#[derive(Debug, Deserialize)]
pub struct TaskForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub status: String,
    pub csrf_token: String,
}

impl TaskForm {
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            project_id: self.project_id.trim().parse::<i64>().ok(),
            status: TaskStatus::parse(&self.status).unwrap_or(TaskStatus::Unrecognized),
        }
    }
}

/// Task editor modal.
///
/// `Closed` -> `Create` (no task) or `Edit` (task given) -> `Closed` on
/// cancel or after a successful save. Opening always rebuilds the fields
/// from the task and the current project list.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Editor {
    #[default]
    Closed,
    Create { draft: TaskDraft, errors: Vec<String> },
    Edit { task_id: i64, draft: TaskDraft, errors: Vec<String> },
}

impl Editor {
    pub fn open(task: Option<&Task>, projects: &[Project]) -> Self {
        match task {
            Some(task) => Editor::Edit {
                task_id: task.id,
                draft: TaskDraft::from_task(task),
                errors: vec![],
            },
            None => Editor::Create { draft: TaskDraft::blank(projects), errors: vec![] },
        }
    }

    /// Keep the editor open on a rejected submission, showing what the user
    /// typed alongside the errors.
    pub fn rejected(task_id: Option<i64>, draft: TaskDraft, errors: Vec<String>) -> Self {
        match task_id {
            Some(task_id) => Editor::Edit { task_id, draft, errors },
            None => Editor::Create { draft, errors },
        }
    }

    pub fn close(self) -> Self {
        Editor::Closed
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Editor::Closed)
    }

    pub fn draft(&self) -> Option<&TaskDraft> {
        match self {
            Editor::Closed => None,
            Editor::Create { draft, .. } | Editor::Edit { draft, .. } => Some(draft),
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            Editor::Closed => &[],
            Editor::Create { errors, .. } | Editor::Edit { errors, .. } => errors,
        }
    }

    /// Form target for the open editor.
    pub fn form_action(&self) -> String {
        match self {
            Editor::Edit { task_id, .. } => format!("/tasks/{task_id}"),
            _ => "/tasks".to_string(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Editor::Edit { .. } => "Edit Task",
            _ => "New Task",
        }
    }
}
