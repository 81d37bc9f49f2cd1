use crate::stack::reconcile::StackOperations;
use crate::stack::status::StackStatus;
use crate::stack::StackRequest;
use async_trait::async_trait;
use aws_sdk_cloudformation::types::{Capability, Parameter};
use eyre::{OptionExt, WrapErr};

/// CloudFormation-backed implementation of [`StackOperations`]
pub struct CloudFormationStacks {
    client: aws_sdk_cloudformation::Client,
}

impl CloudFormationStacks {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudformation::Client::new(config),
        }
    }

    /// Tear the stack down without waiting for the deletion to finish
    pub async fn delete(&self, name: &str) -> eyre::Result<()> {
        self.client
            .delete_stack()
            .stack_name(name)
            .send()
            .await
            .wrap_err("Failed to delete stack")?;

        Ok(())
    }

    fn parameters(request: &StackRequest) -> Vec<Parameter> {
        request
            .parameters
            .iter()
            .map(|(key, value)| {
                Parameter::builder()
                    .parameter_key(key)
                    .parameter_value(value)
                    .build()
            })
            .collect()
    }

    fn capabilities(request: &StackRequest) -> Vec<Capability> {
        request
            .capabilities
            .iter()
            .map(|capability| Capability::from(capability.as_str()))
            .collect()
    }
}

#[async_trait]
impl StackOperations for CloudFormationStacks {
    async fn describe(&self, name: &str) -> eyre::Result<Option<StackStatus>> {
        let result = self
            .client
            .describe_stacks()
            .set_stack_name(Some(name.into()))
            .send()
            .await;

        let response = match result {
            Ok(response) => response,

            Err(aws_sdk_cloudformation::error::SdkError::ServiceError(err)) => {
                // A missing stack surfaces as a validation error
                if err.err().meta().code() == Some("ValidationError") {
                    return Ok(None);
                }

                return Err(eyre::eyre!(
                    "Service error while describing stack: {:?}",
                    err
                ));
            }

            Err(e) => return Err(eyre::eyre!("Failed to describe stack: {:?}", e)),
        };

        let status = match response.stacks().first() {
            Some(stack) => stack
                .stack_status()
                .ok_or_eyre("Stack description is missing a status")?
                .as_str(),
            None => return Ok(None),
        };

        Ok(Some(StackStatus::from(status)))
    }

    async fn create(&self, request: &StackRequest) -> eyre::Result<()> {
        self.client
            .create_stack()
            .stack_name(&request.name)
            .template_body(&request.template_body)
            .set_parameters(Some(Self::parameters(request)))
            .set_capabilities(Some(Self::capabilities(request)))
            .send()
            .await
            .wrap_err("Failed to create stack")?;

        Ok(())
    }

    async fn update(&self, request: &StackRequest) -> eyre::Result<()> {
        self.client
            .update_stack()
            .stack_name(&request.name)
            .template_body(&request.template_body)
            .set_parameters(Some(Self::parameters(request)))
            .set_capabilities(Some(Self::capabilities(request)))
            .send()
            .await
            .wrap_err("Failed to update stack")?;

        Ok(())
    }
}
