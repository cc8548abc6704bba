pub mod task;
pub mod user;

pub use task::{
    Task, TaskFields, TaskForm, TaskFormView, TaskListViewModel, TaskQuery, TaskViewModel,
    TaskWithAssignee,
};
pub use user::{NewAccount, User, UserListViewModel, UserQuery, UserViewModel};
