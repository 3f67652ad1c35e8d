//! Non-empty string newtypes for entity, table, and model names.

/// Declare a name type. `$what` is the noun used in `EmptyName` errors.
///
/// Serde goes through `TryFrom<String>`, so a blank name in `sluice.yml`
/// fails at load time with `[E009]` instead of surfacing later as an
/// empty SQL identifier.
macro_rules! define_newtype_string {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident = $what:literal;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        $vis struct $Name(String);

        impl $Name {
            /// Wrap a name known to be non-empty (literals, validated input).
            pub fn new(name: impl Into<String>) -> Self {
                let name = name.into();
                debug_assert!(!name.is_empty(), concat!("empty ", $what));
                Self(name)
            }

            /// `None` for an empty name
            pub fn try_new(name: impl Into<String>) -> Option<Self> {
                Self::try_from(name.into()).ok()
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $Name {
            type Error = $crate::error::CoreError;

            fn try_from(name: String) -> Result<Self, Self::Error> {
                if name.trim().is_empty() {
                    return Err($crate::error::CoreError::EmptyName {
                        context: $what.to_string(),
                    });
                }
                Ok(Self(name))
            }
        }

        impl From<$Name> for String {
            fn from(name: $Name) -> String {
                name.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

pub(crate) use define_newtype_string;
