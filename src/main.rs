use std::io;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::info;

use catalog::config::Settings;
use catalog::db::connection::{init_pool, run_migrations};
use catalog::{api, AppState};

fn io_error(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

async fn start_server(settings: Settings, app_state: web::Data<AppState>) -> io::Result<()> {
    let address = (settings.server.host.clone(), settings.server.port);
    info!("Starting HTTP server on http://{}:{}", address.0, address.1);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(api::configure)
    })
    .bind(address)?
    .run()
    .await
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::load().map_err(io_error)?;

    let pool = init_pool(&settings.database).map_err(io_error)?;
    let mut conn = pool.get().map_err(io_error)?;
    run_migrations(&mut conn).map_err(io_error)?;
    drop(conn);

    let app_state = web::Data::new(AppState::new(pool, settings.security.bcrypt_cost));
    start_server(settings, app_state).await
}
