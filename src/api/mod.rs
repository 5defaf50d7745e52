//! Finance REST API: wire schemas, transport and typed client.

pub mod client;
pub mod memory;
pub mod transport;
pub mod types;

pub use client::FinanceClient;
pub use memory::MemoryTransport;
pub use transport::{ApiRequest, HttpTransport, Method, Transport};
