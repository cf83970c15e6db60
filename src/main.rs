use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use splitledger::reminder::LogNotifier;
use splitledger::routes::{self, SharedNotifier};
use splitledger::settings::Settings;
use splitledger::store::Store;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let settings = Settings::new().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "splitledger={level},actix_web={level}",
            level = settings.app.level
        ))
        .init();

    let store = Store::connect(&settings.storage).await.map_err(|err| {
        tracing::error!("failed to initialize storage: {err}");
        io::Error::new(io::ErrorKind::Other, err)
    })?;
    let store = web::Data::new(store);
    let notifier: web::Data<SharedNotifier> = web::Data::from(Arc::new(LogNotifier) as Arc<SharedNotifier>);
    let analytics = web::Data::new(settings.analytics.clone());

    tracing::info!("Server listening on {}:{}", settings.server.host, settings.server.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(store.clone())
            .app_data(notifier.clone())
            .app_data(analytics.clone())
            .configure(routes::configure)
    })
    .bind((settings.server.host.as_str(), settings.server.port))?
    .run()
    .await
}
