pub mod field;
pub mod policy;
pub mod symbol;
