//! CLI subcommand implementations.

pub mod day;
pub mod edit;
pub mod histogram;
pub mod history;
pub mod log;
pub mod naps;
pub mod record;
pub mod status;
pub mod util;
