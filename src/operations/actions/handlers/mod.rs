//! Concrete action handler implementations

pub mod library_create;
pub mod library_delete;
pub mod file_copy;
pub mod file_delete;
pub mod location_add;
pub mod location_remove;
pub mod location_index;

// Re-export all handlers
pub use library_create::LibraryCreateHandler;
pub use library_delete::LibraryDeleteHandler;
pub use file_copy::FileCopyHandler;
pub use file_delete::FileDeleteHandler;
pub use location_add::LocationAddHandler;
pub use location_remove::LocationRemoveHandler;
pub use location_index::LocationIndexHandler;