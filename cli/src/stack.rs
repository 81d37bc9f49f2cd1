pub mod aws;
pub mod reconcile;
pub mod status;

pub use reconcile::{Reconciler, StackDeployError, StackOperations};
pub use status::StackStatus;

/// Capability grant required by templates that create IAM resources
pub const CAPABILITY_IAM: &str = "CAPABILITY_IAM";

/// Everything CloudFormation needs to create or update one stack
#[derive(Debug, Clone)]
pub struct StackRequest {
    pub name: String,

    /// Full template document, submitted inline
    pub template_body: String,

    /// Template parameters as key/value pairs, submitted in order
    pub parameters: Vec<(String, String)>,

    /// Capability grants acknowledged on submission, e.g. [`CAPABILITY_IAM`]
    pub capabilities: Vec<String>,
}
