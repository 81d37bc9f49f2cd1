pub mod deploy;
pub mod destroy;
pub mod package;
pub mod status;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Package the function, upload it and provision the stack
    Deploy(deploy::DeployCommand),

    /// Build the local code archive without touching the cloud
    Package(package::PackageCommand),

    /// Show the current status of the stack
    Status(status::StatusCommand),

    /// Delete the stack
    Destroy(destroy::DestroyCommand),
}
