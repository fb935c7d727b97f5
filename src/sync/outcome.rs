use crate::error::{LoadError, SkipReason};

/// Result of a controller operation.
///
/// `Skipped` is benign: the view keeps its last good state. `Fatal` is a
/// structural load failure the caller must surface.
#[derive(Debug)]
pub enum Outcome<T> {
    Ok(T),
    Skipped(SkipReason),
    Fatal(LoadError),
}

impl<T> Outcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Ok(value) => Some(value),
            _ => None,
        }
    }

    pub fn skipped(&self) -> Option<&SkipReason> {
        match self {
            Outcome::Skipped(reason) => Some(reason),
            _ => None,
        }
    }
}

impl<T> From<Result<T, SkipReason>> for Outcome<T> {
    fn from(result: Result<T, SkipReason>) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(reason) => Outcome::Skipped(reason),
        }
    }
}

impl<T> From<Result<T, LoadError>> for Outcome<T> {
    fn from(result: Result<T, LoadError>) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(err) => Outcome::Fatal(err),
        }
    }
}
