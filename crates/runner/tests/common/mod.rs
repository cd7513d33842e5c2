
/// Mock capabilities for the finder and the launchers.
pub mod mocks;
