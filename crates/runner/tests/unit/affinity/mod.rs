



/// `/proc/stat` parsing and deltas.
pub mod usage;
