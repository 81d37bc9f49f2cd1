use crate::runner::{Runnable, Runner};
use skiff::archive;
use skiff::error::Error;
use std::path::PathBuf;
use std::time::Instant;

#[derive(clap::Args, Clone)]
pub(crate) struct PackageCommand {
    /// Directory with the function code to package
    #[arg(long, value_name = "DIR")]
    pub(crate) function_dir: PathBuf,

    /// Where to write the packaged archive
    #[arg(long, value_name = "FILE")]
    pub(crate) zip_path: PathBuf,
}

impl Runnable for PackageCommand {
    fn runner(&self) -> impl Runner {
        PackageRunner {
            command: self.clone(),
        }
    }
}

pub(crate) struct PackageRunner {
    command: PackageCommand,
}

impl Runner for PackageRunner {
    async fn run(&mut self) -> Result<(), Error> {
        let start_time = Instant::now();
        let function_dir = self.command.function_dir.clone();
        let zip_path = self.command.zip_path.clone();

        let count =
            tokio::task::spawn_blocking(move || archive::zip_directory(&function_dir, &zip_path))
                .await
                .map_err(|e| self.error("Packaging task aborted", None, Some(Box::new(e))))??;

        println!(
            "    {} `{}` ({} files) in {:.2}s",
            console::style("Packaged").green().bold(),
            self.command.zip_path.display(),
            count,
            start_time.elapsed().as_secs_f64(),
        );

        Ok(())
    }
}
