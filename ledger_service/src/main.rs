use dotenvy::dotenv;
use ledger_service::{
    api::{
        grpc_service::LedgerGrpcService,
        http_routes::{routes, AppState},
        proto::ledger::ledger_server::LedgerServer,
    },
    infrastructure::accounting::in_memory::InMemoryAccountingStore,
    use_cases::{
        create_account::CreateAccountUseCase, freeze_amount::FreezeAmountUseCase,
        get_account::GetAccountUseCase, post_transfer::PostTransferUseCase,
        settle_transfer::SettleTransferUseCase, void_transfer::VoidTransferUseCase,
    },
};
use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        ledger_service::api::http_routes::create_account,
        ledger_service::api::http_routes::get_account,
        ledger_service::api::http_routes::get_balance,
        ledger_service::api::http_routes::internal_transfer
    ),
    components(schemas(
        ledger_service::api::http_routes::CreateAccountRequest,
        ledger_service::api::http_routes::InternalTransferRequest,
        ledger_service::api::http_routes::AccountResponse,
        ledger_service::api::http_routes::BalanceResponse,
        ledger_service::api::response::ApiResponse<serde_json::Value>
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

    info!("Starting Ledger Service...");

    // 3. Instanciar Dependencias (Infraestructura)
    // TODO: Reemplazar InMemoryAccountingStore con el cliente del motor contable real
    let store = Arc::new(InMemoryAccountingStore::new());

    // 4. Instanciar Casos de Uso
    let create_account_use_case = CreateAccountUseCase::new(store.clone());
    let get_account_use_case = GetAccountUseCase::new(store.clone());
    let post_transfer_use_case = PostTransferUseCase::new(store.clone());

    // 5. Configurar Servidor gRPC
    let grpc_host = env::var("GRPC_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let grpc_port = env::var("GRPC_PORT").unwrap_or_else(|_| "50051".to_string());
    let grpc_addr = format!("{}:{}", grpc_host, grpc_port).parse()?;

    let grpc_service = LedgerGrpcService::new(
        GetAccountUseCase::new(store.clone()),
        FreezeAmountUseCase::new(store.clone()),
        SettleTransferUseCase::new(store.clone()),
        VoidTransferUseCase::new(store.clone()),
    );

    info!("gRPC Server listening on {}", grpc_addr);

    // Ejecutar servidor gRPC en un hilo / tarea separada
    tokio::spawn(async move {
        if let Err(e) = tonic::transport::Server::builder()
            .add_service(LedgerServer::new(grpc_service))
            .serve(grpc_addr)
            .await
        {
            tracing::error!("gRPC server error: {}", e);
        }
    });

    // 6. Configurar Estado de la App Axum
    let app_state = Arc::new(AppState {
        create_account_use_case,
        get_account_use_case,
        post_transfer_use_case,
    });

    // 7. Configurar Rutas y Servidor HTTP
    let app = routes(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("{}:{}", host, port);

    info!("HTTP Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
