//! Auth-domain identifiers, application credentials, and token models.

pub mod app;
pub mod id;
pub mod token;

pub use app::*;
pub use id::*;
pub use token::{record::*, secret::*};
