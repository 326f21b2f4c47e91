mod export;
mod init;

pub use export::cmd_export;
pub use init::cmd_init;
