use crate::runner::{Runnable, Runner};
use skiff::aws;
use skiff::error::Error;
use skiff::stack::aws::CloudFormationStacks;
use std::io::{self, Write};

#[derive(clap::Args, Clone)]
pub(crate) struct DestroyCommand {
    /// Name of the CloudFormation stack
    #[arg(long, value_name = "NAME")]
    pub(crate) stack_name: String,

    /// Region hosting the stack
    #[arg(long, value_name = "REGION")]
    pub(crate) region: String,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub(crate) yes: bool,
}

impl Runnable for DestroyCommand {
    fn runner(&self) -> impl Runner {
        DestroyRunner {
            command: self.clone(),
        }
    }
}

pub(crate) struct DestroyRunner {
    command: DestroyCommand,
}

impl Runner for DestroyRunner {
    async fn run(&mut self) -> Result<(), Error> {
        if !self.command.yes && !self.confirmed()? {
            println!("{}", console::style("Destroying canceled").dim().bold());
            return Ok(());
        }

        println!(
            "{}: {}",
            console::style("Destroying").bold(),
            console::style(&self.command.stack_name)
        );

        let config = aws::sdk_config(&self.command.region).await;
        CloudFormationStacks::new(&config)
            .delete(&self.command.stack_name)
            .await?;

        println!(
            "{}",
            console::style("Stack deletion requested, resources disappear shortly").green()
        );

        Ok(())
    }
}

impl DestroyRunner {
    /// Ask before tearing anything down
    fn confirmed(&self) -> Result<bool, Error> {
        print!(
            "{} {}: ",
            console::style("Do you want to proceed?").bold(),
            console::style("[y/N]").dim()
        );
        io::stdout()
            .flush()
            .map_err(|e| self.error("Failed to flush stdout", None, Some(Box::new(e))))?;

        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .map_err(|e| self.error("Failed to read input", None, Some(Box::new(e))))?;

        Ok(matches!(input.trim().to_lowercase().as_ref(), "y" | "yes"))
    }
}
