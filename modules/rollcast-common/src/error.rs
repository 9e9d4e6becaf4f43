use thiserror::Error;

#[derive(Error, Debug)]
pub enum RollcastError {
    #[error("Configuration error: {0}")]
    Config(String),
}
