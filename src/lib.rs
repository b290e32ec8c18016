//! Launches and resets a local multi-node network.
//!
//! Each node is an external process started from one executable. The
//! process learns which node it is from the `CHAINDATA_PATH` environment
//! variable, which points at its own `V<i>` working directory.

pub mod cli;
pub mod config;
pub mod error;
pub mod network;
pub mod stage;
pub mod supervisor;
pub mod topology;

pub use config::{tool_dir, NetworkConfig};
pub use error::{NetError, Result};
pub use network::LocalNetwork;
pub use stage::Stager;
pub use supervisor::{CoreExecutable, NodeExit, NodeHandle, Supervisor};
pub use topology::{node_count, ModePolicy, NodeSlot, Topology};
