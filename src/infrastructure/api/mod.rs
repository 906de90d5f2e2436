//! API infrastructure

pub mod file_sharing;
// pub mod graphql;  // Temporarily disabled due to missing async_graphql dependency
// pub mod file_ops;  // Temporarily disabled due to GraphQL dependencies

pub use file_sharing::{FileSharing, SharingTarget, SharingOptions, TransferId, SharingError, TransferStatus, TransferState};
// pub use graphql::create_schema;