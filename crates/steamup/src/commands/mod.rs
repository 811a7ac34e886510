//! Command implementations, one per run phase.

/// The cleanup phase: save the config cache.
pub mod cleanup;
/// The setup phase: acquire the tool and prepare the environment.
pub mod setup;
