use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::api::TaskStatus;
use crate::auth::csrf;
use crate::auth::session::{SessionUser, require_user, set_flash};
use crate::errors::{AppError, render, see_other};
use crate::state::AppState;
use crate::tasks::editor::{Editor, TaskForm};
use crate::tasks::{BoardData, TaskBoard, TaskFilter, TaskFilterParams};
use crate::templates_structs::{PageContext, TaskBoardTemplate, board_url};
use super::guard_session;

#[derive(Deserialize)]
pub struct BoardParams {
    pub project_id: Option<String>,
    pub status: Option<String>,
    pub edit: Option<String>,
    pub new: Option<String>,
}

/// Filter carried through mutation forms so the redirect lands on the same
/// board view.
#[derive(Deserialize)]
pub struct FilterFields {
    #[serde(default)]
    pub filter_project_id: String,
    #[serde(default)]
    pub filter_status: String,
}

impl FilterFields {
    fn to_filter(&self) -> TaskFilter {
        TaskFilterParams {
            project_id: Some(self.filter_project_id.clone()),
            status: Some(self.filter_status.clone()),
        }
        .to_filter()
    }
}

#[derive(Deserialize)]
pub struct TaskSubmit {
    #[serde(flatten)]
    pub task: TaskForm,
    #[serde(flatten)]
    pub filter: FilterFields,
}

#[derive(Deserialize)]
pub struct DeleteForm {
    pub csrf_token: String,
    #[serde(flatten)]
    pub filter: FilterFields,
}

#[derive(Deserialize)]
pub struct StatusForm {
    pub status: String,
    pub csrf_token: String,
    #[serde(flatten)]
    pub filter: FilterFields,
}

async fn render_board(
    state: &AppState,
    session: &Session,
    user: &SessionUser,
    filter: &TaskFilter,
    editor: impl FnOnce(&BoardData) -> Editor,
) -> Result<HttpResponse, AppError> {
    let scope = user.scope();
    let board = TaskBoard::new(&state.api, &state.cache, &scope, &user.access_token);
    let data = guard_session(session, board.load(filter).await)?;
    let editor = editor(&data);

    let ctx = PageContext::build(session, &state.config, user, "/tasks");
    render(TaskBoardTemplate::new(ctx, &data, filter, &editor))
}

pub async fn board(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<BoardParams>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&session)?;
    let filter = TaskFilterParams {
        project_id: query.project_id.clone(),
        status: query.status.clone(),
    }
    .to_filter();

    let opening_new = query.new.is_some();
    let edit_id = query.edit.as_deref().and_then(|v| v.trim().parse::<i64>().ok());
    render_board(&state, &session, &user, &filter, |data| {
        if opening_new {
            return Editor::open(None, &data.projects);
        }
        match edit_id {
            Some(id) => match data.find_task(id) {
                Some(task) => Editor::open(Some(task), &data.projects),
                None => Editor::Closed,
            },
            None => Editor::Closed,
        }
    })
    .await
}

pub async fn create(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<TaskSubmit>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&session)?;
    csrf::validate_csrf(&session, &form.task.csrf_token)?;
    let filter = form.filter.to_filter();

    let draft = form.task.to_draft();
    let input = match draft.validate() {
        Ok(input) => input,
        Err(errors) => {
            return render_board(&state, &session, &user, &filter, |_| {
                Editor::rejected(None, draft, errors)
            })
            .await;
        }
    };

    let scope = user.scope();
    let board = TaskBoard::new(&state.api, &state.cache, &scope, &user.access_token);
    match guard_session(&session, board.create(&input).await) {
        Ok(_) => {
            set_flash(&session, "Task created");
            Ok(see_other(&board_url(&filter, None)))
        }
        Err(AppError::Api(e)) => {
            log::error!("Task create failed: {e}");
            let message = format!("Could not create task: {}", e.detail().unwrap_or("please try again"));
            render_board(&state, &session, &user, &filter, |_| {
                Editor::rejected(None, draft, vec![message])
            })
            .await
        }
        Err(e) => Err(e),
    }
}

pub async fn update(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<TaskSubmit>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&session)?;
    csrf::validate_csrf(&session, &form.task.csrf_token)?;
    let id = path.into_inner();
    let filter = form.filter.to_filter();

    let draft = form.task.to_draft();
    let input = match draft.validate() {
        Ok(input) => input,
        Err(errors) => {
            return render_board(&state, &session, &user, &filter, |_| {
                Editor::rejected(Some(id), draft, errors)
            })
            .await;
        }
    };

    let scope = user.scope();
    let board = TaskBoard::new(&state.api, &state.cache, &scope, &user.access_token);
    match guard_session(&session, board.update(id, &input).await) {
        Ok(_) => {
            set_flash(&session, "Task updated");
            Ok(see_other(&board_url(&filter, None)))
        }
        Err(AppError::Api(e)) => {
            log::error!("Task {id} update failed: {e}");
            let message = format!("Could not update task: {}", e.detail().unwrap_or("please try again"));
            render_board(&state, &session, &user, &filter, |_| {
                Editor::rejected(Some(id), draft, vec![message])
            })
            .await
        }
        Err(e) => Err(e),
    }
}

pub async fn delete(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<DeleteForm>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let id = path.into_inner();
    let filter = form.filter.to_filter();

    let scope = user.scope();
    let board = TaskBoard::new(&state.api, &state.cache, &scope, &user.access_token);
    match guard_session(&session, board.delete(id).await) {
        Ok(()) => set_flash(&session, "Task deleted"),
        Err(AppError::Api(e)) => {
            log::error!("Task {id} delete failed: {e}");
            set_flash(&session, "Could not delete task");
        }
        Err(e) => return Err(e),
    }
    Ok(see_other(&board_url(&filter, None)))
}

pub async fn change_status(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<StatusForm>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let id = path.into_inner();
    let filter = form.filter.to_filter();

    let Some(status) = TaskStatus::parse(&form.status) else {
        set_flash(&session, "Unknown task status");
        return Ok(see_other(&board_url(&filter, None)));
    };

    let scope = user.scope();
    let board = TaskBoard::new(&state.api, &state.cache, &scope, &user.access_token);
    match guard_session(&session, board.change_status(id, status).await) {
        Ok(task) => set_flash(&session, &format!("Moved '{}' to {}", task.name, status.label())),
        Err(AppError::Api(e)) => {
            log::error!("Task {id} status change failed: {e}");
            set_flash(&session, "Could not change task status");
        }
        Err(e) => return Err(e),
    }
    Ok(see_other(&board_url(&filter, None)))
}
