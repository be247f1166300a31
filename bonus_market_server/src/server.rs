use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use bonus_market_engine::{
    reconciliation::{ReconciliationPool, TokioClock},
    AccountApi,
    AccrualClient,
    AuthApi,
    JobQueue,
    OrderFlowApi,
    Reconciler,
    RetryPolicy,
    SqliteDatabase,
    WalletApi,
};
use log::*;

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    recovery_worker::start_recovery_worker,
    routes::{
        health,
        BalanceRoute,
        LoginRoute,
        MyOrdersRoute,
        RegisterRoute,
        SubmitOrderRoute,
        WithdrawRoute,
        WithdrawalsRoute,
    },
};

/// Runs the bonus market until the HTTP server stops.
///
/// Startup order: database and migrations, the reconciliation worker pool, startup recovery (in the background), and
/// finally the HTTP server. On the way out, the job queue is closed and the workers are given time to drain it.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    config.auth.warn_if_random_secret();
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    let oracle = AccrualClient::new(&config.accrual_address, config.accrual_timeout)
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let queue = JobQueue::new(config.queue_capacity);
    let reconciler = Reconciler::new(db.clone(), oracle, TokioClock, RetryPolicy::default());
    let pool = ReconciliationPool::start(reconciler, queue.clone(), config.worker_count);
    if config.recover_on_startup {
        start_recovery_worker(db.clone(), queue.clone());
    } else {
        info!("🚀️ Startup recovery is disabled");
    }
    let srv = create_server_instance(config, db.clone(), queue)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    info!("🚀️ HTTP server stopped. Waiting for reconciliation workers to finish.");
    pool.shutdown();
    pool.join().await;
    db.close().await;
    result
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    queue: JobQueue,
) -> Result<Server, ServerError> {
    let run_address = config.run_address.clone();
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), queue.clone());
        let accounts_api = AccountApi::new(db.clone());
        let wallet_api = WalletApi::new(db.clone());
        let auth_api = AuthApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let user_scope = web::scope("/api/user")
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(SubmitOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(BalanceRoute::<SqliteDatabase>::new())
            .service(WithdrawRoute::<SqliteDatabase>::new())
            .service(WithdrawalsRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bm::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(wallet_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(jwt_signer))
            .service(health)
            .service(user_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind(run_address.as_str())?
    .run();
    info!("🚀️ Listening on {run_address}");
    Ok(srv)
}
