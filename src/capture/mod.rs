mod controller;
mod session;
#[cfg(test)]
mod tests;

pub use controller::CaptureController;
pub use session::{CaptureGuard, CaptureSession, SessionTicket};
