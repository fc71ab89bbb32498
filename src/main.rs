use dotenvy::dotenv;
use fulfillment_service::config::Settings;
use fulfillment_service::{build_server, create_pool, run_migrations, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().map_err(std::io::Error::other)?;

    let pool = create_pool(&settings.database_url, settings.db_pool_size)
        .map_err(std::io::Error::other)?;
    run_migrations(&pool).map_err(std::io::Error::other)?;

    log::info!(
        "Starting server at http://{}:{}",
        settings.host,
        settings.port
    );

    build_server(AppState::with_pool(pool), &settings.host, settings.port)?.await
}
