// src/error.rs

use core::fmt;

// Generates `into_inner`, `Display` and `Error` for enums whose every variant
// carries the rejected value.
macro_rules! impl_error_for_enum_with_inner {
    (
        $enum_name:ident < $generic_param:ident >,
        $($variant:ident ( $message:expr ) ),+
        $(,)?
    ) => {
        impl<$generic_param> $enum_name<$generic_param> {
            /// Consumes the error, returning the value that could not be sent.
            #[inline]
            pub fn into_inner(self) -> $generic_param {
                match self {
                    $( $enum_name::$variant(v) => v, )+
                }
            }
        }

        impl<$generic_param> fmt::Display for $enum_name<$generic_param> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( $enum_name::$variant(_) => f.write_str($message), )+
                }
            }
        }

        impl<$generic_param> std::error::Error for $enum_name<$generic_param> {}
    };
}

/// Error returned by [`Future::try_send`](crate::future::Future::try_send)
/// when the value could not be written. The rejected value is handed back.
#[derive(PartialEq, Eq, Clone)]
pub enum TrySendError<T> {
  /// The future already holds a value. Futures are single-assignment, so the
  /// stored value is left untouched and this one is returned.
  Sent(T),
}

impl<T> fmt::Debug for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Sent(_) => write!(f, "TrySendError::Sent(..)"),
    }
  }
}

impl_error_for_enum_with_inner!(
  TrySendError<T>,
  Sent("future already sent a value"),
);

/// Error returned by non-blocking receive operations.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryRecvError {
  /// Nothing has been sent at the receiver's position yet.
  Empty,
}
impl std::error::Error for TryRecvError {}
impl fmt::Display for TryRecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TryRecvError::Empty => write!(f, "nothing sent yet"),
    }
  }
}
