mod gate;
mod simulated;

pub use gate::{CameraAuthorizer, PermissionGate, PermissionState};
pub use simulated::SimulatedAuthorizer;
