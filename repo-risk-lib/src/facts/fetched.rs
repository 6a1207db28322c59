use core::fmt::{Display, Formatter, Result as FmtResult};

/// Outcome of a single request issued through a [`Gateway`](super::Gateway).
///
/// A missing resource is a normal fact, not a failure, so it gets its own variant and
/// callers never have to inspect status codes to tell the two apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    /// The request succeeded and produced a payload.
    Found(T),

    /// The resource does not exist (HTTP 404).
    Absent,

    /// Any other failure: a non-2xx status, a transport problem, or an undecodable body.
    Error { status: Option<u16>, message: String },
}

impl<T> Fetched<T> {
    pub(crate) fn error(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Error {
            status,
            message: message.into(),
        }
    }

    /// Returns `true` if the result is `Found`.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns `true` if the result is `Error`.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Treats `Absent` as an empty/default payload and keeps `Error` as unknown.
    ///
    /// List endpoints return 404 for things like empty repositories, which is
    /// semantically an empty list rather than missing data.
    #[must_use]
    pub fn found_or_default(self) -> Option<T>
    where
        T: Default,
    {
        match self {
            Self::Found(data) => Some(data),
            Self::Absent => Some(T::default()),
            Self::Error { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Found(data) => Fetched::Found(f(data)),
            Self::Absent => Fetched::Absent,
            Self::Error { status, message } => Fetched::Error { status, message },
        }
    }
}

impl<T> Display for Fetched<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Found(_) => write!(f, "found"),
            Self::Absent => write!(f, "not found"),
            Self::Error { status: Some(status), message } => write!(f, "HTTP {status}: {message}"),
            Self::Error { status: None, message } => write!(f, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_or_default_treats_absent_as_empty() {
        assert_eq!(Fetched::<Vec<u32>>::Absent.found_or_default(), Some(Vec::new()));
        assert_eq!(Fetched::Found(vec![1]).found_or_default(), Some(vec![1]));
        assert_eq!(Fetched::<Vec<u32>>::error(None, "timeout").found_or_default(), None);
    }

    #[test]
    fn test_map_preserves_variant() {
        assert_eq!(Fetched::Found(2).map(|x| x * 2), Fetched::Found(4));
        assert_eq!(Fetched::<u32>::Absent.map(|x| x * 2), Fetched::Absent);
        assert!(Fetched::<u32>::error(Some(502), "bad gateway").map(|x| x * 2).is_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(Fetched::<u32>::error(Some(500), "oops").to_string(), "HTTP 500: oops");
        assert_eq!(Fetched::<u32>::Absent.to_string(), "not found");
    }
}
