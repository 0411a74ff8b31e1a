// ABOUTME: Command module aggregator for the ecs-deploy CLI.
// ABOUTME: Re-exports the deploy and listing command handlers.

mod deploy;
mod list;

pub use deploy::deploy;
pub use list::{services, taskdefs};
