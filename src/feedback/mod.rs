mod device;
mod emitter;
mod mock;
#[cfg(test)]
mod tests;

pub use device::{HapticDevice, ImpactStrength};
pub use emitter::{FeedbackEmitter, FeedbackKind};
pub use mock::{LoggingHaptics, RecordingHaptics};
