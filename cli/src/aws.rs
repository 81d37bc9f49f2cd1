use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Shared AWS configuration pinned to the region everything deploys into
pub async fn sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}
