use crate::archive;
use crate::progress::DeployProgress;
use crate::stack::reconcile::{Reconciler, StackOperations};
use crate::stack::{StackRequest, StackStatus, CAPABILITY_IAM};
use crate::storage::{self, ObjectStore};
use eyre::{OptionExt, WrapErr};
use std::path::PathBuf;
use std::time::Instant;

/// Everything one deploy run needs to know
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Directory with the function code to package
    pub function_dir: PathBuf,

    /// Where the packaged archive is written locally
    pub zip_path: PathBuf,

    /// Bucket holding packaged function code
    pub code_bucket: String,

    /// Object key of the archive inside the code bucket
    pub zip_key: String,

    /// Name of the CloudFormation stack
    pub stack_name: String,

    /// Path to the stack template document
    pub template_path: PathBuf,

    /// Bucket the pipeline watches for new objects
    pub source_bucket: String,

    /// Bucket the pipeline copies objects into
    pub destination_bucket: String,

    /// Local file uploaded to the source bucket to exercise the pipeline
    pub test_file: PathBuf,
}

impl DeployConfig {
    /// Template parameters wiring the three buckets into the stack
    fn parameters(&self) -> Vec<(String, String)> {
        vec![
            ("SourceBucketName".to_string(), self.source_bucket.clone()),
            (
                "DestinationBucketName".to_string(),
                self.destination_bucket.clone(),
            ),
            ("LambdaCodeBucketName".to_string(), self.code_bucket.clone()),
        ]
    }

    /// Key under which the test artifact lands in the source bucket
    fn test_file_key(&self) -> eyre::Result<String> {
        Ok(self
            .test_file
            .file_name()
            .ok_or_eyre("Test file path has no file name")?
            .to_string_lossy()
            .into_owned())
    }

    async fn stack_request(&self) -> eyre::Result<StackRequest> {
        let template_body = tokio::fs::read_to_string(&self.template_path)
            .await
            .wrap_err_with(|| {
                format!("Failed to read template {}", self.template_path.display())
            })?;

        Ok(StackRequest {
            name: self.stack_name.clone(),
            template_body,
            parameters: self.parameters(),
            capabilities: vec![CAPABILITY_IAM.to_string()],
        })
    }
}

/// Ships the function end to end
///
/// Packages the code directory, makes sure the code bucket exists, uploads
/// the archive, settles the stack, then drops the test artifact into the
/// source bucket to exercise the fresh deployment.
pub struct Pipeline<S, O> {
    store: S,
    reconciler: Reconciler<O>,
    config: DeployConfig,
}

impl<S: ObjectStore, O: StackOperations> Pipeline<S, O> {
    pub fn builder() -> PipelineBuilder<S, O> {
        PipelineBuilder::default()
    }

    pub async fn run(&self) -> eyre::Result<StackStatus> {
        let start_time = Instant::now();
        let progress = DeployProgress::new("Deploying", 5);
        let stage = progress.progress(&self.config.stack_name);

        stage.log_stage("Packaging");
        let function_dir = self.config.function_dir.clone();
        let zip_path = self.config.zip_path.clone();

        let packaged =
            tokio::task::spawn_blocking(move || archive::zip_directory(&function_dir, &zip_path))
                .await
                .wrap_err("Packaging task aborted")?
                .map_err(|e| {
                    stage.error("Packaging");
                    e.wrap_err("Failed to package the function directory")
                })?;

        log::info!(
            "Packaged {packaged} files from {}",
            self.config.function_dir.display()
        );
        progress.advance();

        stage.log_stage("Preparing");
        storage::ensure_bucket(&self.store, &self.config.code_bucket)
            .await
            .map_err(|e| {
                stage.error("Preparing");
                e.wrap_err(format!(
                    "Failed to prepare bucket \"{}\"",
                    self.config.code_bucket
                ))
            })?;
        progress.advance();

        stage.log_stage("Uploading");
        storage::upload_if_absent(
            &self.store,
            &self.config.code_bucket,
            &self.config.zip_key,
            &self.config.zip_path,
        )
        .await
        .map_err(|e| {
            stage.error("Uploading");
            e.wrap_err(format!(
                "Failed to upload function code to \"{}\"",
                self.config.code_bucket
            ))
        })?;
        progress.advance();

        stage.log_stage("Provisioning");
        let request = self.config.stack_request().await.map_err(|e| {
            stage.error("Provisioning");
            e
        })?;

        let status = match self.reconciler.reconcile(&request).await {
            Ok(status) => status,
            Err(error) => {
                stage.error("Provisioning");
                progress.finish();
                return Err(error.into());
            }
        };
        progress.advance();

        stage.log_stage("Verifying");
        let test_key = self.config.test_file_key().map_err(|e| {
            stage.error("Verifying");
            e
        })?;

        storage::upload_file(
            &self.store,
            &self.config.source_bucket,
            &test_key,
            &self.config.test_file,
        )
        .await
        .map_err(|e| {
            stage.error("Verifying");
            e.wrap_err("Failed to upload the test artifact")
        })?;
        progress.advance();

        stage.finish();
        progress.finish();

        println!(
            "    {} `{}` deployed in {:.2}s",
            console::style("Finished").green().bold(),
            self.config.stack_name,
            start_time.elapsed().as_secs_f64(),
        );

        Ok(status)
    }
}

pub struct PipelineBuilder<S, O> {
    store: Option<S>,
    reconciler: Option<Reconciler<O>>,
    config: Option<DeployConfig>,
}

impl<S, O> Default for PipelineBuilder<S, O> {
    fn default() -> Self {
        Self {
            store: None,
            reconciler: None,
            config: None,
        }
    }
}

impl<S: ObjectStore, O: StackOperations> PipelineBuilder<S, O> {
    pub fn build(self) -> eyre::Result<Pipeline<S, O>> {
        Ok(Pipeline {
            store: self
                .store
                .ok_or_eyre("No object store provided to the pipeline")?,
            reconciler: self
                .reconciler
                .ok_or_eyre("No reconciler provided to the pipeline")?,
            config: self
                .config
                .ok_or_eyre("No deploy configuration provided to the pipeline")?,
        })
    }

    pub fn with_store(mut self, store: S) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_reconciler(mut self, reconciler: Reconciler<O>) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    pub fn with_config(mut self, config: DeployConfig) -> Self {
        self.config = Some(config);
        self
    }
}
