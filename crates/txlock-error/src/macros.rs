// Error handling macros
// Provides macros for simplified early returns

/// Return early with an error if a condition is not satisfied
///
/// The error is converted with `Into`, so the same macro works for a concrete
/// error type and for `BoxError` results.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error:expr) => {
        if !($cond) {
            return Err(::core::convert::Into::into($error));
        }
    };
}

/// Bail early with an error
#[macro_export]
macro_rules! bail {
    ($error:expr) => {
        return Err(::core::convert::Into::into($error))
    };
}
