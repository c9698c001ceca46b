pub mod create_account;
pub mod freeze_amount;
pub mod get_account;
pub mod post_transfer;
pub mod settle_transfer;
pub mod void_transfer;

/// Resultado de una escritura idempotente de dos fases.
///
/// `AlreadyExists` significa que un intento anterior con el mismo id ya
/// aplicó la escritura; para un caller que reintenta es éxito.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    AlreadyExists,
}
