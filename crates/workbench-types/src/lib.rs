pub mod message;
pub mod event;
pub mod knowledge;
pub mod config;
pub mod error;
pub mod session;


pub use error::WorkbenchError;
pub type Result<T> = std::result::Result<T, WorkbenchError>;
