/// Mocks of the idle-core finder capabilities.
pub mod affinity;
