//! Scaffold and add workflows built on the resolver, locator, merger and manifest

pub mod add;
pub mod cleanup;
pub mod scaffold;

pub use add::{AddOutcome, Adder};
pub use cleanup::{CleanupOutcome, CleanupRegistry};
pub use scaffold::{Generated, Phase, Scaffolder};
