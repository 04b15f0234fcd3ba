//! Error types and handling for gachadex-core operations.
//!
//! This module provides the error type covering all failures in the
//! suggestion pipeline. Errors are categorized for easier handling and
//! include context about recoverability.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: File system operations while reading snapshots or
//!   persisting analytics
//! - **Network Errors**: HTTP requests against the document store
//! - **Snapshot Errors**: Bundled or on-disk snapshot loading and decoding
//! - **Storage Errors**: Analytics persistence beyond basic file I/O
//! - **Configuration Errors**: Invalid settings or config files
//! - **Serialization Errors**: JSON/TOML conversion failures
//!
//! Most of the pipeline deliberately swallows these errors at its outer
//! surface (search degrades to an empty result list rather than failing),
//! so the taxonomy mainly feeds logging and the CLI's diagnostics.
//!
//! ## Recovery Hints
//!
//! ```rust
//! use gachadex_core::Error;
//!
//! let err = Error::Timeout("store query timed out".to_string());
//! assert!(err.is_recoverable());
//! assert_eq!(err.category(), "timeout");
//! ```

use thiserror::Error;

/// The main error type for gachadex-core operations.
///
/// All fallible functions in gachadex-core return `Result<T, Error>`. The
/// type includes automatic conversion from common library errors and keeps
/// the full source chain available through `source()`.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers file system operations: reading snapshot files, creating the
    /// analytics data directory, writing persisted event tails. The
    /// underlying `std::io::Error` is preserved.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed.
    ///
    /// Covers HTTP requests against the document store. The underlying
    /// `reqwest::Error` is preserved for detailed connection information.
    /// Connection and timeout failures are recoverable; the suggest path
    /// converts them to empty results instead of retrying.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Snapshot loading or decoding failed.
    ///
    /// Occurs when the bundled record snapshot (or a configured snapshot
    /// file) is missing, truncated, or not valid JSON. The static cache
    /// reacts by marking itself unavailable rather than propagating this
    /// upward.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Storage operation failed.
    ///
    /// Covers analytics persistence beyond basic file I/O: resolving the
    /// data directory, replacing a snapshot slot atomically, decoding a
    /// previously persisted tail.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration is invalid or inaccessible.
    ///
    /// Occurs when the config file is malformed, contains values outside
    /// their valid ranges, or the config directory cannot be resolved.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource was not found.
    ///
    /// Used for missing stored queries on the document store (HTTP 404)
    /// and for snapshot files that a configured path points at.
    #[error("Not found: {0}")]
    NotFound(String),

    /// URL is malformed or invalid.
    ///
    /// Occurs when the configured document-store endpoint cannot be parsed
    /// or uses an unsupported scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Operation timed out.
    ///
    /// Only produced by clients constructed with an explicit timeout (the
    /// CLI's one-shot commands); the interactive suggest path imposes none.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Serialization or deserialization failed.
    ///
    /// Occurs when converting between data formats (JSON, TOML) fails due
    /// to syntax errors, schema drift, or corruption.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// Returns `true` for errors that are typically temporary: network
    /// timeouts, connection failures, interrupted I/O. The pipeline never
    /// retries automatically (a user typing again re-triggers the search
    /// naturally), so this feeds logging and the CLI exit messaging only.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gachadex_core::Error;
    /// use std::io;
    ///
    /// assert!(Error::Timeout("slow store".to_string()).is_recoverable());
    /// assert!(Error::Io(io::Error::new(io::ErrorKind::Interrupted, "int")).is_recoverable());
    /// assert!(!Error::Config("bad endpoint".to_string()).is_recoverable());
    /// ```
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => {
                // Consider connection errors as recoverable
                e.is_timeout() || e.is_connect()
            },
            Self::Timeout(_) => true,
            Self::Io(e) => {
                // Consider temporary I/O errors as recoverable
                matches!(
                    e.kind(),
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
                )
            },
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// Returns a static string usable for logging and for grouping errors
    /// in diagnostics output:
    ///
    /// - `"io"` - file system and I/O operations
    /// - `"network"` - document store requests
    /// - `"snapshot"` - bundled/on-disk snapshot handling
    /// - `"storage"` - analytics persistence
    /// - `"config"` - configuration and settings
    /// - `"not_found"` - missing resources
    /// - `"invalid_url"` - endpoint validation
    /// - `"timeout"` - operation timeouts
    /// - `"serialization"` - data format conversion
    /// - `"other"` - uncategorized errors
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Snapshot(_) => "snapshot",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Timeout(_) => "timeout",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
///
/// Used throughout gachadex-core for consistent error handling.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::disallowed_macros,
    clippy::unwrap_used,
    clippy::unnecessary_wraps
)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io;

    #[test]
    fn test_error_display_formatting() {
        // Given: Different error variants
        let errors = vec![
            Error::Snapshot("truncated records".to_string()),
            Error::Storage("disk full".to_string()),
            Error::Config("missing field".to_string()),
            Error::NotFound("stored query".to_string()),
            Error::InvalidUrl("not a url".to_string()),
            Error::Timeout("operation timed out".to_string()),
            Error::Other("unknown error".to_string()),
        ];

        for error in errors {
            // When: Converting to string
            let error_string = error.to_string();

            // Then: Should contain descriptive information
            assert!(!error_string.is_empty());
            match error {
                Error::Snapshot(msg) => {
                    assert!(error_string.contains("Snapshot error"));
                    assert!(error_string.contains(&msg));
                },
                Error::Storage(msg) => {
                    assert!(error_string.contains("Storage error"));
                    assert!(error_string.contains(&msg));
                },
                Error::Config(msg) => {
                    assert!(error_string.contains("Configuration error"));
                    assert!(error_string.contains(&msg));
                },
                Error::NotFound(msg) => {
                    assert!(error_string.contains("Not found"));
                    assert!(error_string.contains(&msg));
                },
                Error::InvalidUrl(msg) => {
                    assert!(error_string.contains("Invalid URL"));
                    assert!(error_string.contains(&msg));
                },
                Error::Timeout(msg) => {
                    assert!(error_string.contains("Timeout"));
                    assert!(error_string.contains(&msg));
                },
                Error::Other(msg) => {
                    assert_eq!(error_string, msg);
                },
                _ => {},
            }
        }
    }

    #[test]
    fn test_error_from_io_error() {
        // Given: Different types of I/O errors
        let io_errors = vec![
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
            io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
            io::Error::new(io::ErrorKind::TimedOut, "operation timed out"),
            io::Error::new(io::ErrorKind::Interrupted, "interrupted"),
        ];

        for io_err in io_errors {
            // When: Converting to our Error type
            let error: Error = io_err.into();

            // Then: Should be IO error variant
            match error {
                Error::Io(inner) => {
                    assert!(!inner.to_string().is_empty());
                },
                _ => panic!("Expected IO error variant"),
            }
        }
    }

    #[test]
    fn test_error_from_serde_json_error() {
        // Given: Invalid JSON
        let bad = serde_json::from_str::<serde_json::Value>("{not json");

        // When: Converting the failure
        let error: Error = bad.unwrap_err().into();

        // Then: Should map to the serialization category
        assert_eq!(error.category(), "serialization");
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_error_categories() {
        // Given: All error variants
        let error_categories = vec![
            (Error::Io(io::Error::other("test")), "io"),
            (Error::Snapshot("test".to_string()), "snapshot"),
            (Error::Storage("test".to_string()), "storage"),
            (Error::Config("test".to_string()), "config"),
            (Error::NotFound("test".to_string()), "not_found"),
            (Error::InvalidUrl("test".to_string()), "invalid_url"),
            (Error::Timeout("test".to_string()), "timeout"),
            (Error::Serialization("test".to_string()), "serialization"),
            (Error::Other("test".to_string()), "other"),
        ];

        for (error, expected_category) in error_categories {
            // When: Getting error category
            let category = error.category();

            // Then: Should match expected category
            assert_eq!(category, expected_category);
        }
    }

    #[test]
    fn test_error_recoverability() {
        // Given: Various error scenarios
        let recoverable_errors = vec![
            Error::Io(io::Error::new(io::ErrorKind::TimedOut, "timeout")),
            Error::Io(io::Error::new(io::ErrorKind::Interrupted, "interrupted")),
            Error::Timeout("request timeout".to_string()),
        ];

        let non_recoverable_errors = vec![
            Error::Io(io::Error::new(io::ErrorKind::NotFound, "not found")),
            Error::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
            Error::Snapshot("bad records".to_string()),
            Error::Storage("disk failure".to_string()),
            Error::Config("invalid config".to_string()),
            Error::NotFound("missing".to_string()),
            Error::InvalidUrl("bad url".to_string()),
            Error::Serialization("bad json".to_string()),
            Error::Other("generic error".to_string()),
        ];

        // When/Then: Testing recoverability
        for error in recoverable_errors {
            assert!(
                error.is_recoverable(),
                "Expected {error:?} to be recoverable"
            );
        }

        for error in non_recoverable_errors {
            assert!(
                !error.is_recoverable(),
                "Expected {error:?} to be non-recoverable"
            );
        }
    }

    #[test]
    fn test_error_chain_source() {
        // Given: IO error that can be converted to our error type
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let core_error: Error = io_error.into();

        // When: Checking error source
        let source = std::error::Error::source(&core_error);

        // Then: Should maintain the source chain
        assert!(source.is_some());
        let source_str = source.unwrap().to_string();
        assert!(source_str.contains("access denied"));
    }

    #[test]
    fn test_result_type_alias() {
        // Given: Function that returns our Result type
        fn test_function() -> Result<i32> {
            Ok(42)
        }

        fn test_error_function() -> Result<i32> {
            Err(Error::Other("test error".to_string()))
        }

        // When: Using the Result type
        let ok_result = test_function();
        let err_result = test_error_function();

        // Then: Should work as expected
        assert!(ok_result.is_ok());
        assert_eq!(ok_result.unwrap(), 42);

        assert!(err_result.is_err());
        if let Err(Error::Other(msg)) = err_result {
            assert_eq!(msg, "test error");
        } else {
            panic!("Expected Other error");
        }
    }

    // Property-based tests
    proptest! {
        #[test]
        fn test_snapshot_error_with_arbitrary_messages(msg in r".{0,1000}") {
            let error = Error::Snapshot(msg.clone());
            let error_string = error.to_string();

            prop_assert!(error_string.contains("Snapshot error"));
            prop_assert!(error_string.contains(&msg));
            prop_assert_eq!(error.category(), "snapshot");
            prop_assert!(!error.is_recoverable());
        }

        #[test]
        fn test_storage_error_with_arbitrary_messages(msg in r".{0,1000}") {
            let error = Error::Storage(msg.clone());
            let error_string = error.to_string();

            prop_assert!(error_string.contains("Storage error"));
            prop_assert!(error_string.contains(&msg));
            prop_assert_eq!(error.category(), "storage");
            prop_assert!(!error.is_recoverable());
        }

        #[test]
        fn test_config_error_with_arbitrary_messages(msg in r".{0,1000}") {
            let error = Error::Config(msg.clone());
            let error_string = error.to_string();

            prop_assert!(error_string.contains("Configuration error"));
            prop_assert!(error_string.contains(&msg));
            prop_assert_eq!(error.category(), "config");
            prop_assert!(!error.is_recoverable());
        }

        #[test]
        fn test_other_error_with_arbitrary_messages(msg in r".{0,1000}") {
            let error = Error::Other(msg.clone());
            let error_string = error.to_string();

            prop_assert_eq!(error_string, msg);
            prop_assert_eq!(error.category(), "other");
            prop_assert!(!error.is_recoverable());
        }
    }

    #[test]
    fn test_error_with_unicode_messages() {
        // Given: Error messages with Unicode content, Vietnamese included
        let unicode_messages = vec![
            "không tìm thấy tệp",
            "Lỗi tải dữ liệu",
            "エラーが発生しました",
            "Произошла ошибка",
        ];

        for unicode_msg in unicode_messages {
            // When: Creating errors with Unicode messages
            let error = Error::Snapshot(unicode_msg.to_string());

            // Then: Should handle Unicode correctly
            let error_string = error.to_string();
            assert!(error_string.contains(unicode_msg));
            assert_eq!(error.category(), "snapshot");
        }
    }

    #[test]
    fn test_error_empty_messages() {
        // Given: Errors with empty messages
        let errors_with_empty_msgs = vec![
            Error::Snapshot(String::new()),
            Error::Storage(String::new()),
            Error::Config(String::new()),
            Error::NotFound(String::new()),
            Error::InvalidUrl(String::new()),
            Error::Timeout(String::new()),
            Error::Other(String::new()),
        ];

        for error in errors_with_empty_msgs {
            // When: Converting to string
            let error_string = error.to_string();

            // Then: Check error formatting behavior
            if let Error::Other(_) = error {
                // Other errors just show the message (which is empty)
                assert_eq!(error_string, "");
            } else {
                // All other errors have descriptive prefixes even with empty messages
                assert!(!error_string.is_empty());
                assert!(
                    error_string.contains(':'),
                    "Error should contain colon separator: '{error_string}'"
                );
            }
        }
    }

    #[test]
    fn test_error_size() {
        // Given: Error enum
        // When: Checking size
        let error_size = std::mem::size_of::<Error>();

        // Then: Should be reasonably sized (not too large)
        assert!(error_size <= 64, "Error type too large: {error_size} bytes");
    }
}
