use std::fmt;

#[derive(Debug, Clone)]
pub enum MetricsError {
    InvalidArgument(String),
    Configuration(String),
    Serialization(String),
}

impl MetricsError {
    /// Stable error code for logs and API payloads
    pub fn code(&self) -> &'static str {
        match self {
            MetricsError::InvalidArgument(_) => "E001",
            MetricsError::Configuration(_) => "E002",
            MetricsError::Serialization(_) => "E003",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            MetricsError::InvalidArgument(_) => "Invalid Argument",
            MetricsError::Configuration(_) => "Configuration Error",
            MetricsError::Serialization(_) => "Serialization Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            MetricsError::InvalidArgument(msg) => msg,
            MetricsError::Configuration(msg) => msg,
            MetricsError::Serialization(msg) => msg,
        }
    }

    /// Colored output for server startup logs
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for MetricsError {}

// Convenience constructors
impl MetricsError {
    pub fn invalid_argument<T: Into<String>>(msg: T) -> Self {
        MetricsError::InvalidArgument(msg.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        MetricsError::Configuration(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        MetricsError::Serialization(msg.into())
    }
}

impl From<serde_json::Error> for MetricsError {
    fn from(err: serde_json::Error) -> Self {
        MetricsError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MetricsError>;
