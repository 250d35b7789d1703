use actix_web::{dev::Service, middleware, web, App, HttpServer};
use anyhow::Context;
use chat_notification_service::{
    firestore::FirestoreClient, handlers::register_routes, logging, metrics, Config,
    FcmPushGateway, NotificationDispatcher, TriggerPattern, MESSAGE_CREATED_PATTERN,
};
use fcm_shared::{FCMClient, ServiceAccountAuth};
use std::sync::Arc;
use std::time::Instant;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_tracing();

    tracing::info!("Starting chat notification service");

    let config = Config::from_env().context("failed to load configuration")?;

    let auth = Arc::new(
        ServiceAccountAuth::from_file(&config.firebase.credentials_path)
            .context("failed to load service account")?,
    );
    if auth.project_id() != config.firebase.project_id {
        tracing::warn!(
            "Service account {} belongs to project {}, sending for {}",
            auth.client_email(),
            auth.project_id(),
            config.firebase.project_id
        );
    }

    let store = FirestoreClient::from_config(&config.firebase, auth.clone());
    if let Some(host) = &config.firebase.emulator_host {
        tracing::info!("Using Firestore emulator at {}", host);
    }

    let fcm = FCMClient::new(config.firebase.project_id.clone(), auth)
        .with_base_url(config.fcm.base_url.clone());

    let dispatcher = Arc::new(
        NotificationDispatcher::new(
            Arc::new(store),
            Arc::new(FcmPushGateway::new(Arc::new(fcm))),
        )
        .with_click_action(config.fcm.click_action.clone()),
    );
    let pattern = TriggerPattern::parse(MESSAGE_CREATED_PATTERN)?;

    let addr = format!("0.0.0.0:{}", config.app.port);
    tracing::info!(
        "Listening for {} triggers on {} ({})",
        MESSAGE_CREATED_PATTERN,
        addr,
        config.app.env
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(dispatcher.clone()))
            .app_data(web::Data::new(pattern.clone()))
            .wrap(middleware::Logger::default())
            .wrap_fn(|req, srv| {
                let method = req.method().to_string();
                // Route pattern keeps label cardinality bounded
                let path = req
                    .match_pattern()
                    .unwrap_or_else(|| "unmatched".to_string());
                let start = Instant::now();

                let fut = srv.call(req);
                async move {
                    let result = fut.await;
                    let status = match &result {
                        Ok(res) => res.status().as_u16(),
                        Err(_) => 500,
                    };
                    metrics::observe_http_request(&method, &path, status, start.elapsed());
                    result
                }
            })
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .configure(register_routes)
    })
    .bind(&addr)?
    .run()
    .await?;

    Ok(())
}
