//! Type definitions for the daemon

pub mod commands;
pub mod common;
pub mod responses;

pub use commands::DaemonCommand;
pub use common::{ConnectedDeviceInfo, DaemonInstance, JobInfo, LibraryInfo, LocationInfo, PairingRequestInfo};
pub use responses::{DaemonResponse, DaemonStatus};