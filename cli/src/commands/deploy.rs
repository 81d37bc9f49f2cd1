mod runner;
use crate::runner::{Runnable, Runner};
use runner::DeployRunner;
use std::path::PathBuf;

#[derive(clap::Args, Clone)]
pub(crate) struct DeployCommand {
    /// Directory with the function code to package
    #[arg(long, value_name = "DIR")]
    pub(crate) function_dir: PathBuf,

    /// Where to write the packaged archive
    #[arg(long, value_name = "FILE")]
    pub(crate) zip_path: PathBuf,

    /// Bucket that stores packaged function code
    #[arg(long, value_name = "BUCKET")]
    pub(crate) code_bucket: String,

    /// Object key for the archive inside the code bucket
    #[arg(long, value_name = "KEY")]
    pub(crate) zip_key: String,

    /// Region hosting the buckets and the stack
    #[arg(long, value_name = "REGION")]
    pub(crate) region: String,

    /// Name of the CloudFormation stack
    #[arg(long, value_name = "NAME")]
    pub(crate) stack_name: String,

    /// Path to the stack template document
    #[arg(long, value_name = "FILE")]
    pub(crate) template: PathBuf,

    /// Bucket the pipeline watches for new objects
    #[arg(long, value_name = "BUCKET")]
    pub(crate) source_bucket: String,

    /// Bucket the pipeline copies objects into
    #[arg(long, value_name = "BUCKET")]
    pub(crate) destination_bucket: String,

    /// File uploaded to the source bucket once the stack settles
    #[arg(long, value_name = "FILE")]
    pub(crate) test_file: PathBuf,

    /// Seconds between stack status checks
    #[arg(long, value_name = "SECONDS", default_value_t = 30)]
    pub(crate) poll_interval: u64,

    /// Give up after this many status checks, waits forever when omitted
    #[arg(long, value_name = "COUNT")]
    pub(crate) max_polls: Option<usize>,
}

impl Runnable for DeployCommand {
    fn runner(&self) -> impl Runner {
        DeployRunner {
            command: self.clone(),
        }
    }
}
