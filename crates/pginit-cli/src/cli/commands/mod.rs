//! Subcommand implementations.

mod docker_acceptance_test;
mod mandatory;
mod sleep;
mod version;

pub use docker_acceptance_test::run_docker_acceptance_test;
pub use mandatory::run_mandatory;
pub use sleep::run_sleep;
pub use version::run_version;
