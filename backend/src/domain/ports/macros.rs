//! Helper macro for declaring adapter error enums on domain ports.
//!
//! Every variant carries named fields; the macro derives `thiserror::Error`
//! and emits a snake-case constructor per variant whose parameters accept
//! anything convertible into the field type.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),+ },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = "Construct the `" $variant "` variant."]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                }
            )+
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SampleStoreError {
            Connection { message: String } => "store unavailable: {message}",
            Conflict { table: String, rows: u32 } => "{rows} rows conflicted in {table}",
        }
    }

    #[test]
    fn constructors_accept_str() {
        let err = SampleStoreError::connection("refused");
        assert_eq!(err.to_string(), "store unavailable: refused");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = SampleStoreError::conflict("temp_matricula", 2_u32);
        assert_eq!(err.to_string(), "2 rows conflicted in temp_matricula");
    }
}
