pub mod authorize_payment;
pub mod present_payment;
pub mod submit_transfer;
