mod navigator;

pub use navigator::{
    HandoffOutcome, Navigator, RecordingNavigator, ResultHandoff, RouteRequest, ANALYSIS_ROUTE,
};
