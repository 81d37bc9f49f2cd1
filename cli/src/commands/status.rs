use crate::runner::{Runnable, Runner};
use skiff::aws;
use skiff::error::Error;
use skiff::stack::aws::CloudFormationStacks;
use skiff::stack::StackOperations;

#[derive(clap::Args, Clone)]
pub(crate) struct StatusCommand {
    /// Name of the CloudFormation stack
    #[arg(long, value_name = "NAME")]
    pub(crate) stack_name: String,

    /// Region hosting the stack
    #[arg(long, value_name = "REGION")]
    pub(crate) region: String,
}

impl Runnable for StatusCommand {
    fn runner(&self) -> impl Runner {
        StatusRunner {
            command: self.clone(),
        }
    }
}

pub(crate) struct StatusRunner {
    command: StatusCommand,
}

impl Runner for StatusRunner {
    async fn run(&mut self) -> Result<(), Error> {
        let config = aws::sdk_config(&self.command.region).await;
        let stacks = CloudFormationStacks::new(&config);

        match stacks.describe(&self.command.stack_name).await? {
            Some(status) => println!(
                "{}: {status}",
                console::style(&self.command.stack_name).bold()
            ),
            None => println!(
                "{}: not found",
                console::style(&self.command.stack_name).bold()
            ),
        }

        Ok(())
    }
}
