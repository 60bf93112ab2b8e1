//! Federation gRPC communication

pub mod auth;
pub mod client;
pub mod server;

// Include generated protobuf code
pub mod foghorn {
    pub mod federation {
        #![allow(clippy::all)]
        #![allow(warnings)]
        include!("proto/foghorn.federation.rs");
    }
}

pub use auth::{require_service_auth, CallType, ServiceAuthInterceptor, SERVICE_TOKEN_HEADER};
pub use client::{FederationClient, FederationClientConfig};
pub use foghorn::federation::federation_server::FederationServer as FederationServiceServer;
pub use server::FederationServer;
