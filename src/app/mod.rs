pub mod controller;
pub mod polling;
pub mod session;

pub use controller::AppController;
pub use session::SessionController;
