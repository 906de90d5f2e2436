pub mod path;
pub mod types;

pub use path::{SidecarPath, SidecarPathBuilder};
pub use types::{SidecarKind, SidecarVariant, SidecarFormat, SidecarStatus};