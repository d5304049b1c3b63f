use thiserror::Error;

/// Why a single uploaded file produced no series.
///
/// Always scoped to one file: callers loading a batch record it and carry on.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading `{name}`: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{name}` is not valid UTF-8 text (line {line})")]
    Encoding { name: String, line: u64 },

    #[error("parsing `{name}`: {source}")]
    Csv {
        name: String,
        #[source]
        source: csv::Error,
    },
}

impl LoadError {
    /// Name of the file the error belongs to.
    pub fn name(&self) -> &str {
        match self {
            LoadError::Io { name, .. }
            | LoadError::Encoding { name, .. }
            | LoadError::Csv { name, .. } => name,
        }
    }

    /// Classify a `csv` reader error for the given file.
    pub(crate) fn from_csv(name: &str, err: csv::Error) -> Self {
        let name = name.to_string();
        if err.is_io_error() {
            return LoadError::Io {
                name,
                source: err.into(),
            };
        }
        let utf8_line = match err.kind() {
            csv::ErrorKind::Utf8 { pos, .. } => Some(pos.as_ref().map(|p| p.line()).unwrap_or(0)),
            _ => None,
        };
        match utf8_line {
            Some(line) => LoadError::Encoding { name, line },
            None => LoadError::Csv { name, source: err },
        }
    }
}
