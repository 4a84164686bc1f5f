//! Declarative macro for enumerable header fields.

/// Defines an enum over a raw integer with a trailing `Other(raw)` variant.
///
/// Generates `From<raw>`, `value()`, `known_name()`, `name()` (hex
/// fallback for unknown values), `Display`, and a `Serialize` impl that
/// writes `{ "value": .., "name": .. }`.
macro_rules! lookup_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $repr:ty {
            $($variant:ident = $value:literal => $label:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(#[doc = $label] $variant,)*
            /// Value missing from the lookup table.
            Other($repr),
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                match value {
                    $($value => Self::$variant,)*
                    other => Self::Other(other),
                }
            }
        }

        impl $name {
            /// Raw numeric value.
            pub fn value(self) -> $repr {
                match self {
                    $(Self::$variant => $value,)*
                    Self::Other(value) => value,
                }
            }

            /// Name from the lookup table, if the value is known.
            pub fn known_name(self) -> Option<&'static str> {
                match self {
                    $(Self::$variant => Some($label),)*
                    Self::Other(_) => None,
                }
            }

            /// Display name, falling back to the hex value.
            pub fn name(self) -> std::borrow::Cow<'static, str> {
                match self.known_name() {
                    Some(name) => std::borrow::Cow::Borrowed(name),
                    None => std::borrow::Cow::Owned(format!(
                        "{:#0width$x}",
                        self.value(),
                        width = 2 + 2 * std::mem::size_of::<$repr>()
                    )),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.name())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                use serde::ser::SerializeStruct;
                let mut state = serializer.serialize_struct(stringify!($name), 2)?;
                state.serialize_field("value", &self.value())?;
                state.serialize_field("name", &self.name())?;
                state.end()
            }
        }
    };
}

pub(crate) use lookup_enum;

/// Decode a fixed-width NUL-padded ASCII field, truncating at the first NUL.
pub(crate) fn c_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    lookup_enum! {
        enum Sample: u16 {
            One = 1 => "one",
            Big = 0x1234 => "big",
        }
    }

    #[test]
    fn test_known_and_unknown() {
        assert_eq!(Sample::from(1), Sample::One);
        assert_eq!(Sample::from(0x1234).name(), "big");
        assert_eq!(Sample::from(7), Sample::Other(7));
        assert_eq!(Sample::from(7).name(), "0x0007");
        assert_eq!(Sample::from(7).value(), 7);
        assert_eq!(Sample::Big.value(), 0x1234);
        assert_eq!(Sample::Other(9).known_name(), None);
    }

    #[test]
    fn test_c_string() {
        assert_eq!(c_string(b"v1.0\0\0garbage"), "v1.0");
        assert_eq!(c_string(b"full"), "full");
        assert_eq!(c_string(b"\0abc"), "");
    }
}
