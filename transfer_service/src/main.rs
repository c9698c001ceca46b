use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use transfer_service::{
    api::http_routes::{routes, AppState},
    infrastructure::{
        gateways::grpc_ledger_gateway::GrpcLedgerGateway,
        persistence::{
            matcher::PgPresentmentMatcher, transfer_repository::PostgresTransferRepository,
        },
        runtime::{SignalRegistry, WorkflowHost},
    },
    use_cases::{
        authorize_payment::AuthorizePaymentUseCase, present_payment::PresentPaymentUseCase,
        submit_transfer::SubmitTransferUseCase,
    },
    workflows::WorkflowSettings,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        transfer_service::api::http_routes::authorize,
        transfer_service::api::http_routes::present
    ),
    components(schemas(
        transfer_service::api::http_routes::AmountRequest,
        transfer_service::api::response::ApiResponse<serde_json::Value>
    ))
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Cargar variables de entorno
    dotenv().ok();

    // 2. Configurar Logging/Tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting Transfer Service...");

    // 3. Configurar Conexión a Base de Datos
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("Connected to Database");

    // 4. Instanciar Dependencias (Infraestructura)
    let settings = Arc::new(WorkflowSettings::from_env());
    let ledger_url = env::var("LEDGER_GRPC_URL").unwrap_or_else(|_| "http://127.0.0.1:50051".to_string());
    let ledger_gateway = Arc::new(GrpcLedgerGateway::new(ledger_url));
    let transfer_repo = Arc::new(PostgresTransferRepository::new(pool.clone()));

    // El registry de señales lo comparten el matcher (entrega) y el host
    // (suscripción por workflow).
    let registry = Arc::new(SignalRegistry::new());
    let matcher = Arc::new(PgPresentmentMatcher::new(pool.clone(), registry.clone()));

    let workflow_host = Arc::new(WorkflowHost::new(
        ledger_gateway.clone(),
        transfer_repo.clone(),
        matcher,
        registry,
        settings.clone(),
    ));

    // 5. Instanciar Casos de Uso
    let submit_transfer = SubmitTransferUseCase::new(workflow_host, settings.clone());
    let authorize_payment_use_case =
        AuthorizePaymentUseCase::new(ledger_gateway.clone(), submit_transfer.clone());
    let present_payment_use_case = PresentPaymentUseCase::new(
        ledger_gateway.clone(),
        transfer_repo.clone(),
        submit_transfer,
    );

    // 6. Configurar Estado de la App Axum
    let app_state = Arc::new(AppState {
        authorize_payment_use_case,
        present_payment_use_case,
    });

    // 7. Configurar Rutas y Servidor
    let app = routes(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
