//! Log tail error types.

use std::path::PathBuf;

use azerus_domain::error::AzerusError;

/// Errors raised while polling the watched log file.
///
/// All of them are transient: the poller logs them and retries on the next
/// interval.
#[derive(Debug, thiserror::Error)]
pub enum LogTailError {
    /// The file exists but its size could not be read.
    #[error("failed to inspect log source {}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Opening, seeking or reading the appended range failed.
    #[error("failed to read log source {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<LogTailError> for AzerusError {
    fn from(err: LogTailError) -> Self {
        AzerusError::Stream(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_path_in_read_error() {
        let err = LogTailError::Read {
            path: PathBuf::from("/var/log/game.log"),
            source: std::io::Error::other("boom"),
        };
        assert_eq!(err.to_string(), "failed to read log source /var/log/game.log");
    }

    #[test]
    fn should_convert_into_stream_error() {
        let err: AzerusError = LogTailError::Metadata {
            path: PathBuf::from("latest.log"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }
        .into();
        assert!(matches!(err, AzerusError::Stream(_)));
    }
}
