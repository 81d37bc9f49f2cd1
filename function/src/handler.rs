use async_trait::async_trait;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Deserialize;
use serde_json::{json, Value};

/// S3 `ObjectCreated` notification, trimmed to the fields the copy needs
#[derive(Debug, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Deserialize)]
pub struct S3EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub object: ObjectEntity,
}

#[derive(Debug, Deserialize)]
pub struct ObjectEntity {
    pub key: String,
}

/// Copies one object between buckets
#[async_trait]
pub trait ObjectCopier {
    async fn copy(
        &self,
        source_bucket: &str,
        destination_bucket: &str,
        key: &str,
    ) -> Result<(), lambda_runtime::Error>;
}

pub struct S3Copier {
    client: aws_sdk_s3::Client,
}

impl S3Copier {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
        }
    }
}

// The copy source travels in a header, so the key must be percent-encoded
// again after the event decoding below
const COPY_SOURCE_ENCODING: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'?');

#[async_trait]
impl ObjectCopier for S3Copier {
    async fn copy(
        &self,
        source_bucket: &str,
        destination_bucket: &str,
        key: &str,
    ) -> Result<(), lambda_runtime::Error> {
        let copy_source = format!(
            "{source_bucket}/{}",
            utf8_percent_encode(key, COPY_SOURCE_ENCODING)
        );

        self.client
            .copy_object()
            .copy_source(copy_source)
            .bucket(destination_bucket)
            .key(key)
            .send()
            .await
            .map_err(|error| {
                lambda_runtime::Error::from(format!("Failed to copy \"{key}\": {error}"))
            })?;

        Ok(())
    }
}

// Keys in event records are URL-encoded with spaces turned into pluses
fn decode_key(key: &str) -> String {
    percent_decode_str(&key.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Copy every object named by the event into the destination bucket
pub async fn handle<C: ObjectCopier>(
    copier: &C,
    source_bucket: &str,
    destination_bucket: &str,
    event: S3Event,
) -> Result<Value, lambda_runtime::Error> {
    for record in &event.records {
        let key = decode_key(&record.s3.object.key);

        log::info!("Copying {key} from {source_bucket} to {destination_bucket}");
        copier.copy(source_bucket, destination_bucket, &key).await?;
    }

    Ok(json!({ "status": "copied" }))
}
