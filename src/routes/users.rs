use crate::{
    error::AppError,
    identity::CredentialStore,
    models::{UserListViewModel, UserQuery, UserViewModel},
};
use actix_web::{get, web, HttpResponse};

/// Lists accounts, optionally keeping those whose user name, e-mail or full name
/// contains `searchString` (case-sensitive).
#[get("")]
pub async fn index(
    store: web::Data<dyn CredentialStore>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, AppError> {
    let search = query.search();
    let users = store
        .list_accounts(search)
        .await?
        .into_iter()
        .map(UserViewModel::from)
        .collect();

    Ok(HttpResponse::Ok().json(UserListViewModel {
        users,
        current_filter: search.map(str::to_string),
    }))
}

#[get("/Details/{id}")]
pub async fn details(
    store: web::Data<dyn CredentialStore>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = user_id.into_inner();
    match store.find_by_id(&id).await? {
        Some(user) => Ok(HttpResponse::Ok().json(UserViewModel::from(user))),
        None => Err(AppError::NotFound(format!("User {} not found", id))),
    }
}
