use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use taskkeeper::auth::TokenCodec;
use taskkeeper::config::Config;
use taskkeeper::emails::LogMailer;
use taskkeeper::routes;
use taskkeeper::store::{MemoryStore, PgStore, Store};
use taskkeeper::AppState;

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

async fn open_store(config: &Config) -> io::Result<Arc<dyn Store>> {
    match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await.map_err(startup_error)?;
            store.migrate().await.map_err(startup_error)?;
            log::info!("connected to Postgres, migrations applied");
            Ok(Arc::new(store))
        }
        None => {
            log::warn!("DATABASE_URL is not set; data is kept in memory and lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let store = open_store(&config).await?;

    let state = web::Data::new(AppState::new(
        store,
        TokenCodec::new(&config.jwt_secret),
        Arc::new(LogMailer::new(config.mail_from.clone())),
        config.bcrypt_cost,
    ));

    log::info!("Starting taskkeeper server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
