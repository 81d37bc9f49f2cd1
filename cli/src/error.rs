use crate::stack::StackDeployError;

/// User-facing error shown in a unified format
#[derive(Debug)]
pub struct Error(String, Option<String>);

impl Error {
    pub fn new(message: &str, details: Option<&str>) -> Self {
        Error(message.to_string(), details.map(|d| d.to_string()))
    }
}

/// Display the message, then the details as sort of a hint
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.1 {
            Some(details) => write!(f, "{}\n\n{}", self.0, console::style(details).dim()),
            None => write!(f, "{}", self.0),
        }
    }
}

impl std::error::Error for Error {}

/// Convert eyre reports, keeping an already typed Error intact
impl From<eyre::ErrReport> for Error {
    fn from(error: eyre::ErrReport) -> Self {
        error
            .downcast::<Error>()
            .unwrap_or_else(|err| Error::new(&err.to_string(), None))
    }
}

/// Attach a recovery hint to each way a deployment can go wrong
impl From<StackDeployError> for Error {
    fn from(error: StackDeployError) -> Self {
        let hint = match &error {
            StackDeployError::QueryFailed(_) => "Check AWS credentials and the --region flag.",
            StackDeployError::SubmissionRejected(_) => {
                "Validate the template and the stack parameters."
            }
            StackDeployError::StackFailed(_) => {
                "Inspect the stack events in the CloudFormation console, then re-run the deploy."
            }
            StackDeployError::PollingFailed(_) => {
                "The submission may still be applying. Re-run the deploy to converge."
            }
            StackDeployError::Timeout(_) => {
                "Raise --max-polls or leave it unset to wait indefinitely."
            }
        };

        Error::new(&error.to_string(), Some(hint))
    }
}
