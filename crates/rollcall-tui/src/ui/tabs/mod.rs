pub mod accounting;
pub mod admin;
pub mod invoices;
pub mod register;
pub mod stats;
