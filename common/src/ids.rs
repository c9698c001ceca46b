use uuid::Uuid;

/// Convierte el id externo de cuenta (u64 de la API) al id de 128 bits del
/// motor contable, extendiendo con ceros. El id es opaco para el núcleo.
///
/// # Examples
/// ```
/// use common::ids::account_ledger_id;
///
/// assert_eq!(account_ledger_id(2), 2u128);
/// ```
pub fn account_ledger_id(external_id: u64) -> u128 {
    external_id as u128
}

/// Convierte un id de transferencia (UUID v4) al id de 128 bits del motor
/// contable. El UUID completo cabe sin pérdida.
pub fn transfer_ledger_id(id: Uuid) -> u128 {
    id.as_u128()
}
