// Consistent exit codes for the contribart CLI.
//
//   0   = success
//   1   = general error
//   2   = usage/validation error
//   13  = network error (push failed)
//   130 = cancelled by the user

use contribart_common::pattern::PatternError;
use contribart_common::remote::RemoteError;
use contribart_common::types::IdentityError;
use contribart_engine::PaintError;

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    Network = 13,
    Cancelled = 130,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(paint) = cause.downcast_ref::<PaintError>() {
                return Self::from_paint_error(paint);
            }
            if cause.downcast_ref::<PatternError>().is_some()
                || cause.downcast_ref::<RemoteError>().is_some()
                || cause.downcast_ref::<IdentityError>().is_some()
            {
                return Self::Usage;
            }
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>() {
                return match io_err.kind() {
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::ConnectionRefused => {
                        Self::Network
                    }
                    _ => Self::Error,
                };
            }
        }

        Self::Error
    }

    pub fn from_paint_error(error: &PaintError) -> Self {
        if error.is_validation() {
            Self::Usage
        } else if error.is_cancelled() {
            Self::Cancelled
        } else if matches!(error, PaintError::Publish { .. }) {
            Self::Network
        } else {
            Self::Error
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code() as u8)
    }
}
