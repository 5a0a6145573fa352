pub mod ports;
pub mod event_bus;
pub mod decoder;
pub mod stream;
pub mod chat;
