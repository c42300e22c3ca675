use askama::Template;

use crate::api::{Project, TaskStatus};
use crate::tasks::editor::Editor;
use crate::tasks::{BoardData, TaskFilter};
use super::PageContext;

pub struct ProjectOption {
    pub id: i64,
    pub name: String,
    pub selected: bool,
}

pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

pub struct TaskCard {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub project_name: String,
    pub edit_url: String,
    pub statuses: Vec<StatusOption>,
}

pub struct ColumnView {
    pub status: &'static str,
    pub label: &'static str,
    pub cards: Vec<TaskCard>,
}

pub struct EditorView {
    pub title: &'static str,
    pub action: String,
    pub name: String,
    pub description: String,
    pub projects: Vec<ProjectOption>,
    pub statuses: Vec<StatusOption>,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "tasks/board.html")]
pub struct TaskBoardTemplate {
    pub ctx: PageContext,
    pub columns: Vec<ColumnView>,
    pub total: i64,
    pub filter_projects: Vec<ProjectOption>,
    pub filter_statuses: Vec<StatusOption>,
    pub filter_project_id: String,
    pub filter_status: String,
    /// Board URL with the current filters, used by cancel links.
    pub board_url: String,
    pub new_task_url: String,
    pub editor: Option<EditorView>,
}

fn project_options(projects: &[Project], selected: Option<i64>) -> Vec<ProjectOption> {
    projects
        .iter()
        .map(|p| ProjectOption { id: p.id, name: p.name.clone(), selected: Some(p.id) == selected })
        .collect()
}

fn status_options(selected: Option<TaskStatus>) -> Vec<StatusOption> {
    TaskStatus::COLUMNS
        .iter()
        .map(|&s| StatusOption { value: s.as_str(), label: s.label(), selected: Some(s) == selected })
        .collect()
}

/// `/tasks` with the filter applied, plus an optional extra query pair.
pub fn board_url(filter: &TaskFilter, extra: Option<(&str, String)>) -> String {
    let mut pairs: Vec<String> = Vec::new();
    if let Some(id) = filter.project_id {
        pairs.push(format!("project_id={id}"));
    }
    if let Some(status) = filter.status {
        pairs.push(format!("status={}", status.as_str()));
    }
    if let Some((key, value)) = extra {
        pairs.push(format!("{key}={value}"));
    }
    if pairs.is_empty() {
        "/tasks".to_string()
    } else {
        format!("/tasks?{}", pairs.join("&"))
    }
}

impl TaskBoardTemplate {
    pub fn new(ctx: PageContext, board: &BoardData, filter: &TaskFilter, editor: &Editor) -> Self {
        let columns = board
            .columns()
            .into_iter()
            .map(|column| ColumnView {
                status: column.status.as_str(),
                label: column.status.label(),
                cards: column
                    .tasks
                    .iter()
                    .map(|t| TaskCard {
                        id: t.id,
                        name: t.name.clone(),
                        description: t.description.clone().unwrap_or_default(),
                        project_name: board
                            .project_name(t.project_id)
                            .unwrap_or("Unknown project")
                            .to_string(),
                        edit_url: board_url(filter, Some(("edit", t.id.to_string()))),
                        statuses: status_options(Some(t.status)),
                    })
                    .collect(),
            })
            .collect();

        let editor = editor.draft().map(|draft| EditorView {
            title: editor.title(),
            action: editor.form_action(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            projects: project_options(&board.projects, draft.project_id),
            statuses: status_options(Some(draft.status)),
            errors: editor.errors().to_vec(),
        });

        Self {
            ctx,
            columns,
            total: board.total,
            filter_projects: project_options(&board.projects, filter.project_id),
            filter_statuses: status_options(filter.status),
            filter_project_id: filter.project_id.map(|id| id.to_string()).unwrap_or_default(),
            filter_status: filter.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
            board_url: board_url(filter, None),
            new_task_url: board_url(filter, Some(("new", "1".to_string()))),
            editor,
        }
    }
}
