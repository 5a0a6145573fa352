//! Transport adapters for the answering service.

pub mod fetch;
pub mod simulated;
pub mod knowledge_api;

use std::rc::Rc;
use workbench_core::ports::TransportPort;
use workbench_types::config::{TransportMode, WorkbenchConfig};

pub use fetch::FetchTransport;
pub use simulated::SimulatedTransport;
pub use knowledge_api::{fetch_knowledge_list, KnowledgeListResponse};

/// Build the transport selected by `config.transport.mode`.
pub fn build_transport(config: &WorkbenchConfig) -> Rc<dyn TransportPort> {
    match config.transport.mode {
        TransportMode::Fetch => Rc::new(FetchTransport::new(&config.transport)),
        TransportMode::Simulated => Rc::new(SimulatedTransport::new(config.simulation.clone())),
    }
}
