pub mod canned;
pub mod config;
pub mod content;
pub mod copy;
pub mod error;
pub mod io;
pub mod paths;
pub mod persona;
pub mod stage;
pub mod store;
pub mod suggestion;
pub mod wizard;
pub mod workspace;

pub use error::{FunnelError, Result};
pub use stage::Stage;
pub use workspace::Workspace;
