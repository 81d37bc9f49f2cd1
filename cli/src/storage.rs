use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use eyre::WrapErr;
use std::path::Path;

/// Object storage calls the deploy pipeline depends on
#[async_trait]
pub trait ObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> eyre::Result<bool>;

    async fn create_bucket(&self, bucket: &str) -> eyre::Result<()>;

    async fn object_exists(&self, bucket: &str, key: &str) -> eyre::Result<bool>;

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> eyre::Result<()>;
}

/// Create the bucket unless it is already there
///
/// Returns true when the bucket was created on this run.
pub async fn ensure_bucket<S: ObjectStore>(store: &S, bucket: &str) -> eyre::Result<bool> {
    if store.bucket_exists(bucket).await? {
        log::info!("Bucket {bucket} already exists");
        return Ok(false);
    }

    store.create_bucket(bucket).await?;
    log::info!("Created bucket {bucket}");

    Ok(true)
}

/// Upload the file unless the key is already present
///
/// An existing object is left untouched. Returns true when the file went up.
pub async fn upload_if_absent<S: ObjectStore>(
    store: &S,
    bucket: &str,
    key: &str,
    path: &Path,
) -> eyre::Result<bool> {
    if store.object_exists(bucket, key).await? {
        log::info!("Object {key} already in bucket {bucket}, skipping upload");
        return Ok(false);
    }

    upload_file(store, bucket, key, path).await?;

    Ok(true)
}

/// Upload the file, replacing any object already stored under the key
pub async fn upload_file<S: ObjectStore>(
    store: &S,
    bucket: &str,
    key: &str,
    path: &Path,
) -> eyre::Result<()> {
    let body = tokio::fs::read(path)
        .await
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

    store.put_object(bucket, key, body).await?;
    log::info!("Uploaded {} to s3://{bucket}/{key}", path.display());

    Ok(())
}

/// S3-backed implementation of [`ObjectStore`]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    region: Option<String>,
}

impl S3Store {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
            region: config.region().map(|region| region.as_ref().to_string()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn bucket_exists(&self, bucket: &str) -> eyre::Result<bool> {
        let result = self.client.head_bucket().bucket(bucket).send().await;

        if let Err(e) = &result {
            if let aws_sdk_s3::error::SdkError::ServiceError(err) = e {
                if err.err().is_not_found() {
                    return Ok(false);
                }

                return Err(eyre::eyre!(
                    "Service error while checking bucket: {:?}",
                    err
                ));
            }

            return Err(eyre::eyre!("Failed to check bucket: {:?}", e));
        }

        Ok(true)
    }

    async fn create_bucket(&self, bucket: &str) -> eyre::Result<()> {
        let mut request = self.client.create_bucket().bucket(bucket);

        // Outside us-east-1 the target region must be spelled out explicitly
        if let Some(region) = self.region.as_deref() {
            if region != "us-east-1" {
                request = request.create_bucket_configuration(
                    CreateBucketConfiguration::builder()
                        .location_constraint(BucketLocationConstraint::from(region))
                        .build(),
                );
            }
        }

        request
            .send()
            .await
            .wrap_err_with(|| format!("Failed to create bucket {bucket}"))?;

        Ok(())
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> eyre::Result<bool> {
        let result = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;

        if let Err(e) = &result {
            if let aws_sdk_s3::error::SdkError::ServiceError(err) = e {
                if err.err().is_not_found() {
                    return Ok(false);
                }

                return Err(eyre::eyre!(
                    "Service error while checking object: {:?}",
                    err
                ));
            }

            return Err(eyre::eyre!("Failed to check object: {:?}", e));
        }

        Ok(true)
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> eyre::Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .wrap_err_with(|| format!("Failed to upload s3://{bucket}/{key}"))?;

        Ok(())
    }
}
