pub mod logging;
pub mod terminal;

pub use logging::init_logging;
