//! Macro for implementing Display and FromStr for domain enums
//!
//! Keeps the persisted / configured string form of small enums (filter type,
//! filter combination) in one place. Parsing is case-insensitive and output is
//! always lowercase.
//!
//! # Example
//!
//! ```rust
//! use stint_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Visibility {
//!     Shown,
//!     Hidden,
//! }
//!
//! impl_domain_status_conversions!(Visibility {
//!     Shown => "shown",
//!     Hidden => "hidden",
//! });
//!
//! assert_eq!(Visibility::Shown.to_string(), "shown");
//! assert_eq!("HIDDEN".parse::<Visibility>(), Ok(Visibility::Hidden));
//! ```

/// Implements Display and FromStr traits for domain enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations
#[macro_export]
macro_rules! impl_domain_status_conversions {
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

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
