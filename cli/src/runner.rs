use skiff::error::Error;
use std::error::Error as StdError;

/// Unit of work behind each CLI command
pub(crate) trait Runner {
    /// Run the command
    ///
    /// Returns an error shown to the user in case of failure
    async fn run(&mut self) -> Result<(), Error>;

    /// Construct an error shown to the user
    fn error(
        &self,
        title: &str,
        description: Option<&str>,
        origin: Option<Box<dyn StdError>>,
    ) -> Error {
        if let Some(origin) = origin {
            log::error!("{origin:?}");
        }

        Error::new(title, description)
    }
}

/// Return a runner for a command
pub(crate) trait Runnable {
    fn runner(&self) -> impl Runner;
}
