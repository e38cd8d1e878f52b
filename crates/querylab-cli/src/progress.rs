use indicatif::{ProgressBar, ProgressStyle};
use querylab_retrieval::{IndexPhase, IndexProgress};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
        pb.set_style(
            spinner_style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Spinner that follows index building; hidden in JSON mode
pub struct IndexSpinner {
    bar: ProgressBar,
}

impl IndexSpinner {
    pub fn new(hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            create_spinner("Preparing index...")
        };
        Self { bar }
    }

    pub fn update(&self, progress: &IndexProgress) {
        let phase = match progress.phase {
            IndexPhase::Initializing => "init",
            IndexPhase::Loading => "load",
            IndexPhase::Indexing => "index",
            IndexPhase::Committing => "commit",
            IndexPhase::Finalizing => "finalize",
        };
        self.bar.set_message(format!("[{}] {}", phase, progress.message));
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
