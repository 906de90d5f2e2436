pub mod daemon;
pub mod library;
pub mod location;
pub mod job;
pub mod network;
pub mod file;
pub mod system;

// Re-export command types for convenience
pub use daemon::DaemonCommands;
pub use library::LibraryCommands;
pub use location::LocationCommands;
pub use job::JobCommands;
pub use network::NetworkCommands;
pub use file::FileCommands;
pub use system::SystemCommands;