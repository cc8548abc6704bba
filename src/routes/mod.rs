pub mod account;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{get, http::header, web, HttpResponse};

/// `303 See Other`, the answer to every successful form post.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[get("/")]
pub async fn home() -> HttpResponse {
    see_other("/Tasks")
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(home)
        .service(
            web::scope("/Account")
                .service(account::login_form)
                .service(account::login)
                .service(account::register_form)
                .service(account::register)
                .service(account::logout),
        )
        .service(
            web::scope("/Tasks")
                .service(tasks::index)
                .service(tasks::create_form)
                .service(tasks::create)
                .service(tasks::edit_form)
                .service(tasks::edit)
                .service(tasks::delete)
                .service(tasks::toggle_complete),
        )
        .service(
            web::scope("/Users")
                .service(users::index)
                .service(users::details),
        );
}
