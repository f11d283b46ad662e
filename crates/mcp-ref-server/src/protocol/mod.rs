//! Protocol core: JSON-RPC framing, lifecycle state machine, capability
//! negotiation, extension registry, pagination, and the message router.

pub mod extensions;
pub mod jsonrpc;
pub mod lifecycle;
pub mod pagination;
pub mod router;

pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use lifecycle::{LifecycleManager, LifecycleState};
pub use router::MessageRouter;
