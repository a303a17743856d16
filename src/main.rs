use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;

use laundry_tracker::{auth::TokenManager, config::Config, db, email, routes};

/// Seconds a browser may cache a CORS preflight answer.
const CORS_MAX_AGE: usize = 300;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(std::io::Error::other)?;
    let pool = db::connect(&config).await.map_err(std::io::Error::other)?;
    let mailer = email::mailer_from_config(&config.smtp).map_err(std::io::Error::other)?;
    let tokens = TokenManager::from_config(&config);

    let pool_data = web::Data::new(pool);
    let tokens_data = web::Data::new(tokens);
    let mailer_data = web::Data::from(mailer);
    let config_data = web::Data::new(config.clone());

    info!(
        "Starting laundry tracker ({}) at {}",
        config.env,
        config.server_url()
    );

    let fe_base_url = config.fe_base_url.clone();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&fe_base_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allow_any_header()
            .supports_credentials()
            .max_age(CORS_MAX_AGE);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(pool_data.clone())
            .app_data(tokens_data.clone())
            .app_data(mailer_data.clone())
            .app_data(config_data.clone())
            .configure(routes::config)
            .default_service(web::to(routes::not_found))
    })
    .client_request_timeout(config.read_timeout)
    .client_disconnect_timeout(config.write_timeout)
    .keep_alive(config.idle_timeout)
    .shutdown_timeout(30)
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
