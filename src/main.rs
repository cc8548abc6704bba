use std::io;

use actix_web::{middleware::Logger, App, HttpServer};
use dotenv::dotenv;

use taskapp::{config::Config, db, seed, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let pool = db::connect(&config.database_url)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let state = AppState::from_config(&config, pool);

    // A store that cannot be prepared is logged; the server still starts.
    match db::initialize(&state.pool, config.reset_database_on_start).await {
        Ok(()) => {
            if let Err(err) = seed::ensure_admin(state.store.as_ref()).await {
                log::error!("An error occurred while seeding the database: {}", err);
            }
        }
        Err(err) => log::error!("An error occurred while initializing the database: {}", err),
    }

    log::info!(
        "Starting TaskApp server at {} (locale {})",
        config.server_url(),
        config.locale.tag()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(state.auth())
            .wrap(Logger::default())
            .configure(|cfg| state.configure(cfg))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
