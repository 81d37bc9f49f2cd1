use super::DeployCommand;
use crate::runner::Runner;
use skiff::aws;
use skiff::deploy::{DeployConfig, Pipeline};
use skiff::error::Error;
use skiff::stack::aws::CloudFormationStacks;
use skiff::stack::{Reconciler, StackDeployError};
use skiff::storage::S3Store;
use std::time::Duration;

pub(crate) struct DeployRunner {
    pub(crate) command: DeployCommand,
}

impl Runner for DeployRunner {
    async fn run(&mut self) -> Result<(), Error> {
        let command = &self.command;
        let config = aws::sdk_config(&command.region).await;

        let reconciler = Reconciler::new(CloudFormationStacks::new(&config))
            .with_poll_interval(Duration::from_secs(command.poll_interval))
            .with_max_polls(command.max_polls);

        let pipeline = Pipeline::builder()
            .with_store(S3Store::new(&config))
            .with_reconciler(reconciler)
            .with_config(DeployConfig {
                function_dir: command.function_dir.clone(),
                zip_path: command.zip_path.clone(),
                code_bucket: command.code_bucket.clone(),
                zip_key: command.zip_key.clone(),
                stack_name: command.stack_name.clone(),
                template_path: command.template.clone(),
                source_bucket: command.source_bucket.clone(),
                destination_bucket: command.destination_bucket.clone(),
                test_file: command.test_file.clone(),
            })
            .build()?;

        let status = match pipeline.run().await {
            Ok(status) => status,

            // Deployment failures carry a recovery hint, everything else is
            // reported as-is
            Err(report) => {
                return Err(match report.downcast::<StackDeployError>() {
                    Ok(deploy_error) => Error::from(deploy_error),
                    Err(report) => Error::from(report),
                })
            }
        };

        log::info!("Deployment settled with status {status}");

        Ok(())
    }
}
