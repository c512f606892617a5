//! Shared macros for the provider crate.

/// Generate a `fmt::Debug` implementation that redacts sensitive fields.
///
/// Two field kinds are supported, specified as a keyword before the field
/// name:
///
/// - `show field_name` - prints the field value normally
/// - `redact field_name` - prints `"[REDACTED]"` instead of the value
///
/// # Example
///
/// ```ignore
/// redacted_debug!(ProviderConfig {
///     show url,
///     show username,
///     redact password,
/// });
/// ```
macro_rules! redacted_debug {
    ($name:ident { $( $kind:ident $field:ident ),* $(,)? }) => {
        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let mut s = f.debug_struct(stringify!($name));
                $( redacted_debug!(@add_field s, self, $kind, $field); )*
                s.finish_non_exhaustive()
            }
        }
    };
    (@add_field $s:ident, $self:ident, show, $field:ident) => {
        $s.field(stringify!($field), &$self.$field);
    };
    (@add_field $s:ident, $self:ident, redact, $field:ident) => {
        $s.field(stringify!($field), &"[REDACTED]");
    };
}
