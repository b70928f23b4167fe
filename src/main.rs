use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel::MysqlConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

mod config;
mod errors;
mod handlers;
mod models;
mod store;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn run_migrations(pool: &store::Pool) -> io::Result<()> {
    let mut pooled = pool
        .get()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("migrations: {e}")))?;
    let connection: &mut MysqlConnection = &mut pooled;
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("migrations: {e}")))?;
    log::info!("applied {} pending migration(s)", applied.len());
    Ok(())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = config::Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    log::info!(
        "using database {} on {}:{} as {}",
        config.database.database,
        config.database.host,
        config.database.port,
        config.database.user
    );

    let pool = store::build_pool(&config.database);
    if config.run_migrations {
        run_migrations(&pool)?;
    }
    let pool = web::Data::new(pool);

    log::info!("listening on {}:{}", config.bind_address, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(handlers::routes::<store::Pool>)
            .default_service(web::route().to(handlers::not_found))
    })
    .bind((config.bind_address.clone(), config.port))?
    .run()
    .await
}
