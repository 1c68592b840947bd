//! Delivery port - posts a message to the remote service
//!
//! One `post` call is the entire delivery attempt for a trigger: there is no
//! retry, queue or backoff. The outcome keeps the difference between a message
//! the service refused and one that never reached it, even though both are
//! shown the same way on the indicators.

use core::fmt;
use core::future::Future;

use thiserror_no_std::Error;

use crate::config::SUCCESS_STATUS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The service accepted the message
    Sent,
    /// The service answered with a status other than success
    Rejected(u16),
    /// The service could not be reached
    ConnectionFailed,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("rejected with status {0}")]
    Rejected(u16),
    #[error("connection failed")]
    ConnectionFailed,
}

impl DeliveryOutcome {
    /// Classify the status code a reachable service answered with
    pub const fn from_status(status: u16) -> Self {
        if status == SUCCESS_STATUS {
            Self::Sent
        } else {
            Self::Rejected(status)
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Sent)
    }

    /// Status code, if the service was reached
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Sent => Some(SUCCESS_STATUS),
            Self::Rejected(status) => Some(*status),
            Self::ConnectionFailed => None,
        }
    }

    pub const fn into_result(self) -> Result<(), DeliveryError> {
        match self {
            Self::Sent => Ok(()),
            Self::Rejected(status) => Err(DeliveryError::Rejected(status)),
            Self::ConnectionFailed => Err(DeliveryError::ConnectionFailed),
        }
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.into_result() {
            Ok(()) => f.write_str("sent"),
            Err(e) => write!(f, "{e}"),
        }
    }
}

/// Port for posting messages to the remote service
pub trait DeliveryClient {
    /// Make one delivery attempt for `message`
    fn post(&mut self, message: &str) -> impl Future<Output = DeliveryOutcome>;
}
