use console::style;
use querylab_core::error::QuerylabError;
use std::fmt;
use std::path::Path;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Create error for an unknown dataset name
pub fn dataset_not_found(name: &str) -> CliError {
    CliError::new("Dataset not found")
        .with_context(format!(
            "No built-in or configured dataset is called '{}'.",
            name
        ))
        .with_suggestion("Declare it in querylab.toml under [datasets.<name>]")
        .with_suggestion("List the configured datasets: querylab config")
        .with_help("Run: querylab --help")
}

/// Create error for a missing collection file
pub fn dataset_file_missing(path: &Path) -> CliError {
    CliError::new("Dataset file not found")
        .with_context(format!("A file of the configured dataset does not exist.\n\nPath: {}", path.display()))
        .with_suggestion("Download the collection files into the expected location")
        .with_suggestion("Or point the dataset at them in querylab.toml")
        .with_help("Run: querylab status")
}

/// Create error for a malformed collection file
pub fn dataset_format(path: &Path, line: usize, reason: &str) -> CliError {
    CliError::new("Malformed dataset file")
        .with_context(format!("{}:{}: {}", path.display(), line, reason))
        .with_suggestion("Check that the file uses the expected tab or whitespace separated layout")
}

/// Create error for index not built
pub fn index_not_built(path: &Path) -> CliError {
    CliError::new("Index not built")
        .with_context(format!("No index was found at {}.", path.display()))
        .with_suggestion("Build the index: querylab index")
        .with_suggestion("Check status: querylab status")
        .with_help("Run: querylab index --help")
}

/// Create error for an index built from another dataset
pub fn index_stale(path: &Path, built_for: &str, requested: &str) -> CliError {
    CliError::new("Index belongs to another dataset")
        .with_context(format!(
            "The index at {} was built for '{}', but '{}' was requested.",
            path.display(),
            built_for,
            requested
        ))
        .with_suggestion("Rebuild it: querylab index --force")
        .with_suggestion("Or use a separate directory: --index-path <DIR>")
        .with_help("Run: querylab index --help")
}

/// Create error for invalid configuration
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check querylab.toml for syntax errors")
        .with_suggestion("Inspect the effective values: querylab config")
        .with_help("Run: querylab config --help")
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    let domain = error.chain().find_map(|cause| cause.downcast_ref::<QuerylabError>());

    match domain {
        Some(QuerylabError::DatasetNotFound { name }) => dataset_not_found(name),
        Some(QuerylabError::DatasetFileMissing { path }) => dataset_file_missing(path),
        Some(QuerylabError::DatasetFormat { path, line, reason }) => {
            dataset_format(path, *line, reason)
        }
        Some(QuerylabError::IndexNotBuilt { path }) => index_not_built(path),
        Some(QuerylabError::IndexStale { path, built_for, requested }) => {
            index_stale(path, built_for, requested)
        }
        Some(QuerylabError::ConfigInvalid { key, reason }) => invalid_config(key, reason),
        _ => generic(error),
    }
}

fn generic(error: anyhow::Error) -> CliError {
    let message = format!("{:#}", error);

    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check the file path and try again")
    } else if message.to_lowercase().contains("permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check file permissions")
            .with_suggestion("Or run with appropriate privileges")
    } else {
        CliError::new(message)
    }
}
