//! Browser adapters for the workbench core ports.
//!
//! - `storage`: key/value backends (IndexedDB, memory)
//! - `knowledge`: the persisted knowledge list, served as a `KnowledgeSource`
//! - `transport`: fetch and simulated answering transports, knowledge list API

pub mod storage;
pub mod knowledge;
pub mod transport;

#[cfg(test)]
mod tests;
