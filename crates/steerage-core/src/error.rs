pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("table parse error at line {line}: {message}")]
    Table { line: usize, message: String },
}
