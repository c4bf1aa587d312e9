pub mod edit_template;
pub mod error;
pub mod init;
pub mod instructions;
pub mod package_manager;
pub mod post_init;
pub mod rollback;
pub mod template;
pub mod validate;

pub use error::{InitError, Step};
pub use init::{InitReport, Initializer, Options, DEFAULT_VERSION};
