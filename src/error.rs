//! A complete collection of errors.

use std::error;
use std::fmt::{self, Display, Formatter};
use std::io;
use toml::de;

/// A convenient `Result` type whose error type is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The set of possible errors.
#[derive(Debug)]
pub enum Error {
    /// An I/O error reported by the operating system.
    Os { cause: io::Error },

    /// An I/O error resulting from an operation on a file referenced by `path`.
    Io { path: String, cause: io::Error },

    /// An unexpected command-line argument `arg`.
    UnexpectedArg { arg: String },

    /// A value is expected for a command-line argument `arg`.
    ExpectedValue { arg: String },

    /// A `value` given for a command-line argument `arg` is not valid.
    InvalidValue { arg: String, value: String },

    /// An error occurred while parsing a configuration file referenced by `path`.
    Configuration { path: String, cause: String },

    /// A regular expression `pattern` is invalid or too large in compiled form.
    InvalidRegex { pattern: String, cause: String },

    /// The color `name` is neither a `#rrggbb` value nor a known color name.
    InvalidColor { name: String },

    /// The classification `name` is not known.
    InvalidClass { name: String },

    /// The appearance theme `name` is not known.
    InvalidTheme { name: String },

    /// The mode or editor variant `name` is not known.
    InvalidMode { name: String },

    /// Changes to `path` cannot be watched.
    Watch { path: String, cause: String },
}

impl error::Error for Error {}

impl Error {
    pub fn os(cause: io::Error) -> Error {
        Error::Os { cause }
    }

    pub fn io(path: &str, cause: io::Error) -> Error {
        Error::Io {
            path: path.to_string(),
            cause,
        }
    }

    pub fn unexpected_arg(arg: &str) -> Error {
        Error::UnexpectedArg {
            arg: arg.to_string(),
        }
    }

    pub fn expected_value(arg: &str) -> Error {
        Error::ExpectedValue {
            arg: arg.to_string(),
        }
    }

    pub fn invalid_value(arg: &str, value: &str) -> Error {
        Error::InvalidValue {
            arg: arg.to_string(),
            value: value.to_string(),
        }
    }

    pub fn configuration(path: &str, e: &de::Error) -> Error {
        Error::Configuration {
            path: path.to_string(),
            cause: format!("{e}"),
        }
    }

    pub fn invalid_regex(pattern: &str, e: &regex_lite::Error) -> Error {
        Error::InvalidRegex {
            pattern: pattern.to_string(),
            cause: format!("{e}"),
        }
    }

    pub fn invalid_color(name: &str) -> Error {
        Error::InvalidColor {
            name: name.to_string(),
        }
    }

    pub fn invalid_class(name: &str) -> Error {
        Error::InvalidClass {
            name: name.to_string(),
        }
    }

    pub fn invalid_theme(name: &str) -> Error {
        Error::InvalidTheme {
            name: name.to_string(),
        }
    }

    pub fn invalid_mode(name: &str) -> Error {
        Error::InvalidMode {
            name: name.to_string(),
        }
    }

    pub fn watch(path: &str, e: &notify::Error) -> Error {
        Error::Watch {
            path: path.to_string(),
            cause: format!("{e}"),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Os { cause } => write!(f, "I/O error: {cause}"),
            Error::Io { path, cause } => write!(f, "{path}: {cause}"),
            Error::UnexpectedArg { arg } => write!(f, "{arg}: unexpected argument"),
            Error::ExpectedValue { arg } => write!(f, "{arg}: expecting value to follow"),
            Error::InvalidValue { arg, value } => {
                write!(f, "{value}: invalid value following {arg}")
            }
            Error::Configuration { path, cause } => {
                write!(f, "{path}: configuration error: {cause}")
            }
            Error::InvalidRegex { pattern, cause } => {
                write!(f, "{pattern}: invalid regular expression: {cause}")
            }
            Error::InvalidColor { name } => write!(f, "{name}: invalid color"),
            Error::InvalidClass { name } => write!(f, "{name}: unknown classification"),
            Error::InvalidTheme { name } => write!(f, "{name}: unknown theme"),
            Error::InvalidMode { name } => write!(f, "{name}: unknown mode"),
            Error::Watch { path, cause } => write!(f, "{path}: cannot watch: {cause}"),
        }
    }
}
