use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::error::AppError;
use crate::locale::{FieldErrors, Locale};
use crate::models::user::User;

/// Shown in listings for tasks without an assignee.
pub const UNASSIGNED: &str = "Unassigned";

/// A task as stored in the `tasks` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Date only, no time component.
    pub due_date: NaiveDate,
    /// Free-text label such as "Easy" or "Medium".
    pub difficulty: String,
    pub is_completed: bool,
    /// Assignee account id. Cleared by the store when the account is deleted.
    pub user_id: Option<String>,
}

/// A task with its assignee materialized, when it was requested and exists.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskWithAssignee {
    pub task: Task,
    pub assignee: Option<User>,
}

/// The mutable columns of a task, as written by the create and edit flows.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub difficulty: String,
    pub is_completed: bool,
    pub user_id: Option<String>,
}

/// Query string of the task listing.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Substring matched against title and description. Empty means no filter.
    #[serde(rename = "searchString")]
    pub search_string: Option<String>,
}

impl TaskQuery {
    pub fn search(&self) -> Option<&str> {
        self.search_string.as_deref().filter(|s| !s.is_empty())
    }
}

/// Form body posted by the create and edit pages.
///
/// Every rule lives on the struct so that validation is a pure function of the posted
/// values; assignee existence is left to the store's foreign key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskForm {
    /// Echoed back by the edit page and compared with the path id.
    #[serde(default)]
    pub id: i64,

    /// Posted values are trimmed before validation, so the checked text is the stored text.
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom = "not_blank", length(min = 3, max = 100))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: String,

    /// Unparseable dates are treated as missing.
    #[serde(default, deserialize_with = "lenient_date")]
    #[validate(required)]
    pub due_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom = "not_blank", length(max = 50))]
    pub difficulty: String,

    /// Empty selection in the assignee dropdown means unassigned.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_id: Option<String>,

    #[serde(default)]
    pub is_completed: bool,

    #[serde(
        default,
        rename = "__RequestVerificationToken",
        skip_serializing
    )]
    pub request_verification_token: String,
}

impl TaskForm {
    /// A blank create form, due a week after `today`.
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            due_date: Some(today + Duration::days(7)),
            ..Self::default()
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: Some(task.due_date),
            difficulty: task.difficulty.clone(),
            user_id: task.user_id.clone(),
            is_completed: task.is_completed,
            request_verification_token: String::new(),
        }
    }

    /// Columns for a new task. New tasks always start open, whatever was posted.
    pub fn to_new_task(&self) -> Result<TaskFields, AppError> {
        let mut fields = self.to_changes()?;
        fields.is_completed = false;
        Ok(fields)
    }

    /// Columns overwritten by an edit, completion flag included.
    pub fn to_changes(&self) -> Result<TaskFields, AppError> {
        let due_date = self
            .due_date
            .ok_or_else(|| AppError::ValidationError("due_date: required".into()))?;
        Ok(TaskFields {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date,
            difficulty: self.difficulty.clone(),
            is_completed: self.is_completed,
            user_id: self.user_id.clone(),
        })
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

/// One entry of the assignee dropdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssigneeOption {
    pub value: String,
    pub text: String,
    pub selected: bool,
}

pub fn assignee_options(users: &[User], selected: Option<&str>) -> Vec<AssigneeOption> {
    users
        .iter()
        .map(|user| AssigneeOption {
            value: user.id.clone(),
            text: user.full_name.clone(),
            selected: selected == Some(user.id.as_str()),
        })
        .collect()
}

/// Everything the create/edit page needs to render, including a redisplay after
/// failed validation.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskFormView {
    pub form: TaskForm,
    pub assignees: Vec<AssigneeOption>,
    pub errors: FieldErrors,
    pub antiforgery_token: String,
}

/// A task row of the listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskViewModel {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub due_date_display: String,
    pub difficulty: String,
    pub is_completed: bool,
    pub user_id: Option<String>,
    pub assignee_name: String,
}

impl TaskViewModel {
    pub fn from_record(record: TaskWithAssignee, locale: Locale) -> Self {
        let TaskWithAssignee { task, assignee } = record;
        Self {
            id: task.id,
            due_date_display: locale.format_date(task.due_date),
            assignee_name: assignee
                .map(|user| user.full_name)
                .unwrap_or_else(|| UNASSIGNED.to_string()),
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            difficulty: task.difficulty,
            is_completed: task.is_completed,
            user_id: task.user_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListViewModel {
    pub tasks: Vec<TaskViewModel>,
    pub current_filter: Option<String>,
    pub antiforgery_token: String,
}
