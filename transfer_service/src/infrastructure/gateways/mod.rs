pub mod grpc_ledger_gateway;
