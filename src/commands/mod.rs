pub mod invoices;
pub mod loads;
pub mod send;
pub mod settings;
pub mod upload;
