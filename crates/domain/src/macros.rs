//! Macro for implementing Display and FromStr for wire-level enums
//!
//! Redirect parameters and configuration values arrive as strings
//! (`login=already`, `mode = "bff"`). This macro gives those enums one
//! canonical lowercase spelling and case-insensitive parsing.
//!
//! # Example
//!
//! ```rust
//! use passage_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Outcome {
//!     Granted,
//!     Denied,
//! }
//!
//! impl_domain_enum_conversions!(Outcome {
//!     Granted => "granted",
//!     Denied => "denied",
//! });
//!
//! assert_eq!("GRANTED".parse::<Outcome>(), Ok(Outcome::Granted));
//! ```

/// Implements Display and FromStr traits for string-backed enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase string
///   representations
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
