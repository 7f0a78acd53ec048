//! CLI command implementations.

pub mod build;
pub mod init;
pub mod new;
pub mod serve;
pub mod watch;

pub use build::{build_and_watch, build_site};
pub use init::init_project;
pub use new::{new_post, NewPostOptions};
pub use serve::serve_site;
