//! Apple silicon bare-metal servers.

mod client;
mod resource;
mod types;

use std::time::Duration;

pub use client::{AppleSiliconClient, ServerApi};
pub use resource::{
    PrivateNetworkAttachment, PrivateNetworkState, ServerResource, ServerSpec, ServerState,
    ServerUpdate, expand_private_networks, flatten_private_networks,
};
pub use types::{
    CreateServerRequest, ListServerPrivateNetworksResponse, Server, ServerPrivateNetwork,
    ServerStatus, SetServerPrivateNetworksRequest, UpdateServerRequest,
};

/// Default convergence budget for servers. Bare-metal boots sit between
/// container deploys and inference rollouts.
pub const SERVER_TIMEOUT: Duration = Duration::from_secs(10 * 60);
