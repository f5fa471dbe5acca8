// ownd-api: Async sessions against an OpenWebNet gateway (event + command)

pub mod auth;
pub mod codec;
pub mod discovery;
pub mod endpoint;
pub mod error;
pub mod negotiate;
pub mod retry;
pub mod session;
pub mod transport;

pub use discovery::{Discovery, DiscoveryHint, StaticDiscovery};
pub use endpoint::GatewayEndpoint;
pub use error::{ConnectionFault, Error};
pub use negotiate::{Authentication, NegotiationFailure, NegotiationOutcome, SessionKind};
pub use retry::{Backoff, RetryPolicy};
pub use session::{
    CommandSession, EventSession, SendOutcome, Session, SessionState, test_gateway,
    test_gateway_with,
};
pub use transport::{Connector, TcpConnector};
