//! CLI command implementations

pub mod check;
pub mod config;
pub mod golden;
pub mod init;
pub mod run;
pub mod status;

pub use check::execute as check;
pub use config::execute as config;
pub use golden::execute as golden;
pub use init::execute as init;
pub use run::execute as run;
pub use status::execute as status;
