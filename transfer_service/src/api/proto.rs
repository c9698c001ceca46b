// Código generado por tonic-build a partir de proto/ledger.proto
pub mod ledger {
    tonic::include_proto!("ledger");
}
