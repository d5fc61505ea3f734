pub mod utils_files;
pub mod utils_mailbox;
pub mod utils_transports;
