use crate::{
    auth::CurrentUser,
    db::tasks,
    error::AppError,
    identity::CredentialStore,
    locale::{FieldErrors, Locale},
    models::{
        task::assignee_options, TaskForm, TaskFormView, TaskListViewModel, TaskQuery,
        TaskViewModel,
    },
    routes::see_other,
    security::{validate_antiforgery, AntiForgeryForm},
};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::Local;
use sqlx::SqlitePool;
use validator::Validate;

const TASKS_PATH: &str = "/Tasks";

/// Lists tasks with their assignee.
///
/// ## Query Parameters:
/// - `searchString` (optional): keeps tasks whose title or description contains it,
///   case-sensitively. Empty means no filter.
///
/// ## Responses:
/// - `200 OK`: a `TaskListViewModel`; unassigned tasks show `"Unassigned"`.
#[get("")]
pub async fn index(
    pool: web::Data<SqlitePool>,
    locale: web::Data<Locale>,
    query: web::Query<TaskQuery>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let locale = *locale.get_ref();
    let search = query.search();

    let tasks = tasks::list_tasks(&pool, search, true)
        .await?
        .into_iter()
        .map(|record| TaskViewModel::from_record(record, locale))
        .collect();

    Ok(HttpResponse::Ok().json(TaskListViewModel {
        tasks,
        current_filter: search.map(str::to_string),
        antiforgery_token: user.antiforgery_token().to_string(),
    }))
}

/// Empty create form, due in a week, with every account offered as assignee.
#[get("/Create")]
pub async fn create_form(
    store: web::Data<dyn CredentialStore>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let form = TaskForm::blank(Local::now().date_naive());
    let view = form_view(store.get_ref(), form, FieldErrors::new(), &user).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Creates a task from the posted form.
///
/// ## Responses:
/// - `303 See Other` to `/Tasks` once stored. The task always starts open.
/// - `400 Bad Request`: missing or foreign anti-forgery token.
/// - `422 Unprocessable Entity`: the form with the posted values, field messages and
///   the assignee list repopulated.
#[post("/Create")]
pub async fn create(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    store: web::Data<dyn CredentialStore>,
    locale: web::Data<Locale>,
    user: CurrentUser,
    form: web::Form<TaskForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    validate_antiforgery(&req, &user, &form.request_verification_token)?;

    if let Err(errors) = form.validate() {
        let errors = locale.localize(&errors);
        let view = form_view(store.get_ref(), form, errors, &user).await?;
        return Ok(HttpResponse::UnprocessableEntity().json(view));
    }

    let id = tasks::insert_task(&pool, &form.to_new_task()?).await?;
    log::info!("{} created task {}", user.username(), id);

    Ok(see_other(TASKS_PATH))
}

/// Edit form prefilled from the stored task.
///
/// ## Responses:
/// - `200 OK`: a `TaskFormView`.
/// - `404 Not Found`: no task with this id.
#[get("/Edit/{id}")]
pub async fn edit_form(
    pool: web::Data<SqlitePool>,
    store: web::Data<dyn CredentialStore>,
    task_id: web::Path<i64>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let id = task_id.into_inner();
    let record = tasks::find_task(&pool, id, true)
        .await?
        .ok_or_else(|| task_not_found(id))?;

    let form = TaskForm::from_task(&record.task);
    let view = form_view(store.get_ref(), form, FieldErrors::new(), &user).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Overwrites every field of a task, completion flag included.
///
/// ## Responses:
/// - `303 See Other` to `/Tasks` once stored.
/// - `404 Not Found`: the body id differs from the path id, or the task does not exist
///   (also when it disappears while being saved).
/// - `422 Unprocessable Entity`: the form redisplayed with field messages.
/// - `500 Internal Server Error`: the save matched nothing although the task still
///   exists. Not retried.
#[post("/Edit/{id}")]
pub async fn edit(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    store: web::Data<dyn CredentialStore>,
    locale: web::Data<Locale>,
    task_id: web::Path<i64>,
    user: CurrentUser,
    form: web::Form<TaskForm>,
) -> Result<HttpResponse, AppError> {
    let id = task_id.into_inner();
    let form = form.into_inner();
    validate_antiforgery(&req, &user, &form.request_verification_token)?;

    if form.id != id {
        return Err(task_not_found(id));
    }

    if let Err(errors) = form.validate() {
        let errors = locale.localize(&errors);
        let view = form_view(store.get_ref(), form, errors, &user).await?;
        return Ok(HttpResponse::UnprocessableEntity().json(view));
    }

    let changes = form.to_changes()?;
    if tasks::find_task(&pool, id, false).await?.is_none() {
        return Err(task_not_found(id));
    }

    if tasks::update_task(&pool, id, &changes).await? == 0 {
        if !tasks::task_exists(&pool, id).await? {
            return Err(task_not_found(id));
        }
        log::error!("Task {} matched no row on save although it still exists", id);
        return Err(AppError::Concurrency(format!(
            "Task {} was modified while it was being saved",
            id
        )));
    }

    log::info!("{} updated task {}", user.username(), id);
    Ok(see_other(TASKS_PATH))
}

/// Deletes a task. Unknown ids are ignored.
#[post("/Delete/{id}")]
pub async fn delete(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    task_id: web::Path<i64>,
    user: CurrentUser,
    form: Option<web::Form<AntiForgeryForm>>,
) -> Result<HttpResponse, AppError> {
    let id = task_id.into_inner();
    validate_antiforgery(&req, &user, &posted_token(form))?;

    if tasks::delete_task(&pool, id).await? > 0 {
        log::info!("{} deleted task {}", user.username(), id);
    }

    Ok(see_other(TASKS_PATH))
}

/// Flips the completion flag of a task. Unknown ids are ignored.
#[post("/ToggleComplete/{id}")]
pub async fn toggle_complete(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    task_id: web::Path<i64>,
    user: CurrentUser,
    form: Option<web::Form<AntiForgeryForm>>,
) -> Result<HttpResponse, AppError> {
    let id = task_id.into_inner();
    validate_antiforgery(&req, &user, &posted_token(form))?;

    tasks::toggle_task(&pool, id).await?;

    Ok(see_other(TASKS_PATH))
}

async fn form_view(
    store: &dyn CredentialStore,
    form: TaskForm,
    errors: FieldErrors,
    user: &CurrentUser,
) -> Result<TaskFormView, AppError> {
    let users = store.list_accounts(None).await?;
    Ok(TaskFormView {
        assignees: assignee_options(&users, form.user_id.as_deref()),
        form,
        errors,
        antiforgery_token: user.antiforgery_token().to_string(),
    })
}

fn posted_token(form: Option<web::Form<AntiForgeryForm>>) -> String {
    form.map(|form| form.into_inner().token).unwrap_or_default()
}

fn task_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Task {} not found", id))
}
