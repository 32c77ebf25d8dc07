mod device;
mod simulated;

pub use device::{CameraDevice, CapturedImageRef, FacingDirection};
pub use simulated::SimulatedCamera;
