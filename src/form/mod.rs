pub mod image;
pub mod mobile;
pub mod session;
