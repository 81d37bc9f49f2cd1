pub mod archive;
pub mod aws;
pub mod deploy;
pub mod error;
pub mod logger;
pub mod progress;
pub mod stack;
pub mod storage;
