//! Request forwarding: transport selection, cookie rewriting, gateway.

pub mod cookie;
pub mod gateway;
pub mod transport;

pub use cookie::CookieDirective;
pub use gateway::ProxyGateway;
pub use transport::{
    BackendTransport, InProcessTransport, NetworkTransport, register_in_process_backend,
    select_transport,
};
