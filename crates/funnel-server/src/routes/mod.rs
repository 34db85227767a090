pub mod copy;
pub mod library;
pub mod personas;
pub mod stages;
pub mod state;
pub mod wizard;
