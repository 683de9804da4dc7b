//! Configuration I/O shared by the audition binaries

mod io;
mod paths;

pub use io::{load_config, save_config};
pub use paths::{default_config_dir, default_config_path};
