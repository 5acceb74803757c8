use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no usable steps found in recipe text")]
    Parse,

    #[error("timer error: {0}")]
    TimerState(String),

    #[error("suggestion request failed: {0}")]
    Suggestion(String),

    #[error("answer request failed: {0}")]
    Answer(String),

    #[error("step index out of range: step list is empty")]
    OutOfRange,

    #[error("backend error: {0}")]
    Backend(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
}
