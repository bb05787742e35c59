use std::fmt;

use crate::routing::RoutingError;
use crate::settings::SettingsError;

#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    RoutingError(RoutingError),
    SettingsError(SettingsError),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<RoutingError> for Error {
    fn from(err: RoutingError) -> Self {
        Error::RoutingError(err)
    }
}

impl From<SettingsError> for Error {
    fn from(err: SettingsError) -> Self {
        Error::SettingsError(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO Error: {}", e),
            Error::RoutingError(e) => write!(f, "Routing Error: {}", e),
            Error::SettingsError(e) => write!(f, "Settings Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}
