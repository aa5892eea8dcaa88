pub mod account;
mod decoder;
pub mod table;
