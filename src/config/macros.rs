/// Configuration macros
///
/// `config_struct!` declares a configuration struct together with its
/// defaults, so a field's type and default value live on the same line.

/// Define a configuration struct with embedded defaults
///
/// Generates:
/// - The struct with public fields
/// - A `Default` implementation using the listed values
/// - Serde support with `#[serde(default)]`, so a TOML file may omit any field
/// - `FIELDS`, the declared field names, used to flag unknown keys in TOML
///
/// # Example
/// ```ignore
/// config_struct! {
///     pub struct RetryConfig {
///         max_retries: u32 = 3,
///         base_delay_ms: u64 = 500,
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }

        impl $name {
            pub const FIELDS: &'static [&'static str] = &[$(stringify!($field_name)),*];
        }
    };
}
