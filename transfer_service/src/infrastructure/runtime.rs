use crate::domain::entities::{PaymentDetails, PresentmentSignal};
use crate::domain::error::TransferError;
use crate::domain::gateways::{LedgerGateway, WorkflowRuntime, WorkflowSignaler};
use crate::domain::repository::{PresentmentMatcher, TransferRepository};
use crate::workflows::{self, WorkflowSettings};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info};
use uuid::Uuid;

/// Tabla de canales de señal por workflow.
///
/// Cada workflow de autorización escucha en el canal `presentment-<id>`; el
/// matcher entrega ahí la señal. Cuando el workflow termina, el canal se
/// abandona y entregas tardías fallan, lo que hace del reintento tardío un
/// no-op para autorizaciones ya resueltas.
pub struct SignalRegistry {
    channels: Mutex<HashMap<String, mpsc::Sender<PresentmentSignal>>>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn channel_name(workflow_id: Uuid) -> String {
        format!("presentment-{}", workflow_id)
    }

    /// Registra el canal del workflow y devuelve el extremo receptor.
    pub async fn register(&self, workflow_id: Uuid) -> mpsc::Receiver<PresentmentSignal> {
        let (tx, rx) = mpsc::channel(1);
        self.channels
            .lock()
            .await
            .insert(Self::channel_name(workflow_id), tx);
        rx
    }

    pub async fn deregister(&self, workflow_id: Uuid) {
        self.channels
            .lock()
            .await
            .remove(&Self::channel_name(workflow_id));
    }
}

impl Default for SignalRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowSignaler for SignalRegistry {
    async fn signal_presentment(
        &self,
        workflow_id: Uuid,
        signal: PresentmentSignal,
    ) -> Result<(), TransferError> {
        let name = Self::channel_name(workflow_id);
        let sender = { self.channels.lock().await.get(&name).cloned() };

        let Some(sender) = sender else {
            return Err(TransferError::SignalDelivery(format!(
                "no workflow listening on {}",
                name
            )));
        };

        sender.send(signal).await.map_err(|_| {
            TransferError::SignalDelivery(format!("workflow abandoned channel {}", name))
        })
    }
}

/// Host en proceso del runtime durable de workflows.
///
/// Sustituye al host externo con la misma superficie: arranque
/// fire-and-forget por cola de tareas, canal de señal por workflow y timers.
/// Cada workflow corre exactamente una vez; los retries de activity absorben
/// las fallas transitorias.
pub struct WorkflowHost {
    ledger: Arc<dyn LedgerGateway>,
    records: Arc<dyn TransferRepository>,
    matcher: Arc<dyn PresentmentMatcher>,
    registry: Arc<SignalRegistry>,
    settings: Arc<WorkflowSettings>,
}

impl WorkflowHost {
    pub fn new(
        ledger: Arc<dyn LedgerGateway>,
        records: Arc<dyn TransferRepository>,
        matcher: Arc<dyn PresentmentMatcher>,
        registry: Arc<SignalRegistry>,
        settings: Arc<WorkflowSettings>,
    ) -> Self {
        Self {
            ledger,
            records,
            matcher,
            registry,
            settings,
        }
    }
}

#[async_trait]
impl WorkflowRuntime for WorkflowHost {
    async fn start_authorization(&self, details: PaymentDetails) -> Result<(), TransferError> {
        let workflow_id = details.workflow_id;
        let rx = self.registry.register(workflow_id).await;

        let ledger = self.ledger.clone();
        let records = self.records.clone();
        let registry = self.registry.clone();
        let settings = self.settings.clone();

        info!(
            %workflow_id,
            task_queue = %settings.task_queue,
            "starting authorization workflow"
        );

        tokio::spawn(async move {
            let result =
                workflows::authorization::run(ledger, records, rx, &settings, details).await;
            registry.deregister(workflow_id).await;

            match result {
                Ok(progress) => {
                    info!(%workflow_id, %progress, "authorization workflow finished")
                }
                Err(e) => error!(%workflow_id, error = %e, "authorization workflow failed"),
            }
        });

        Ok(())
    }

    async fn start_presentment(&self, details: PaymentDetails) -> Result<(), TransferError> {
        let workflow_id = details.workflow_id;
        let matcher = self.matcher.clone();
        let settings = self.settings.clone();

        info!(
            %workflow_id,
            task_queue = %settings.task_queue,
            "starting presentment workflow"
        );

        tokio::spawn(async move {
            match workflows::presentment::run(matcher, &settings, details).await {
                Ok(authorization_id) => {
                    info!(%workflow_id, %authorization_id, "presentment workflow finished")
                }
                Err(e) => error!(%workflow_id, error = %e, "presentment workflow failed"),
            }
        });

        Ok(())
    }
}
