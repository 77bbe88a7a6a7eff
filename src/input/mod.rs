mod attendee;
mod club_file;
mod columns;
mod config;
mod event;
mod table;

pub use attendee::*;
pub use club_file::*;
pub use columns::*;
pub use config::*;
pub use event::*;
pub use table::*;
