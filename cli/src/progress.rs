use crate::logger::Logger;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Cargo-style progress for multi-stage commands
///
/// A total bar tracks how many stages are done, while each stage prints a
/// right-aligned label line above it as it starts.
pub struct DeployProgress {
    multi_progress: MultiProgress,
    total_bar: ProgressBar,
}

impl DeployProgress {
    pub fn new(verb: &str, total_stages: u64) -> Self {
        let multi_progress = Logger::multi_progress().clone();
        let total_bar = multi_progress.add(ProgressBar::new(total_stages));

        total_bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    format!(
                        "   {} [{{bar:40}}] {{percent}}%",
                        console::style(verb).cyan().bold()
                    )
                    .as_str(),
                )
                .unwrap()
                .progress_chars("=> "),
        );

        total_bar.set_position(0);

        Self {
            multi_progress,
            total_bar,
        }
    }

    /// Stage reporter for one subject, usually the stack name
    pub fn progress(&self, subject: &str) -> StageProgress {
        StageProgress::new(&self.multi_progress, &self.total_bar, subject)
    }

    /// Mark one stage as done
    pub fn advance(&self) {
        self.total_bar.inc(1);
    }

    pub fn finish(&self) {
        self.total_bar.finish_and_clear();
    }
}

/// Prints stage transitions for a single subject
pub struct StageProgress {
    progress_bar: ProgressBar,
    subject: String,
}

impl StageProgress {
    fn new(multi_progress: &MultiProgress, total_bar: &ProgressBar, subject: &str) -> Self {
        let progress_bar = multi_progress.insert_before(total_bar, ProgressBar::new_spinner());

        progress_bar.set_style(ProgressStyle::default_spinner().template("{msg}").unwrap());

        Self {
            progress_bar,
            subject: subject.to_string(),
        }
    }

    pub fn log_stage(&self, stage: &str) {
        self.progress_bar.println(format!(
            "{} {}",
            console::style(with_padding(stage)).green().bold(),
            self.subject,
        ));
    }

    pub fn error(&self, stage: &str) {
        self.progress_bar.finish_with_message(format!(
            "{} {}",
            console::style(with_padding(stage)).red().bold(),
            self.subject,
        ));
    }

    pub fn finish(&self) {
        self.progress_bar.finish_and_clear();
    }
}

// Right-align the label to the cargo-like column
fn with_padding(message: &str) -> String {
    let padding = " ".repeat(12usize.saturating_sub(message.len()));
    format!("{padding}{message}")
}
