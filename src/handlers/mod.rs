pub mod extract;
pub mod files;
pub mod responders;
