//! NextGCore SBI (Service Based Interface) Library
//!
//! Local SBI state shared by the 5G core network functions:
//!
//! - [`types`] - NF types and URI schemes
//! - [`client`] - outbound client handles
//! - [`server`] - configured listeners
//! - [`context`] - listeners, NRF endpoint and the self NF profile
//! - [`uri`] - URI splitting and address pinning
//! - [`error`] - Error types
//!
//! Connections, TLS and HTTP/2 framing are owned by the transport runtime.

pub mod client;
pub mod context;
pub mod error;
pub mod server;
pub mod types;
pub mod uri;

// Re-export commonly used types
pub use client::{SbiClient, SbiClientConfig};
pub use context::{NfInfo, NfInstance, PortInfo, SbiContext, SeppDomain, SeppInfo};
pub use error::{SbiError, SbiResult};
pub use server::{SbiServer, StreamId, OGS_SBI_DEFAULT_PORT};
pub use types::{NfType, UriScheme};
pub use uri::{getaddr_from_uri, ResolvedUri};
