use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<csv::Error> for ResearchError {
    fn from(err: csv::Error) -> Self {
        ResearchError::Csv(err.to_string())
    }
}
