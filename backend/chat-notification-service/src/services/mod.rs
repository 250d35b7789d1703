pub mod dispatcher;
pub mod document_store;
pub mod push_gateway;

pub use dispatcher::*;
pub use document_store::*;
pub use push_gateway::*;
