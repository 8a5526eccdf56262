//! Error construction macros.

/// Create a configuration error.
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::error::GatewayError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::GatewayError::config(format!($fmt, $($arg)*))
    };
}

/// Create an unauthorized error.
#[macro_export]
macro_rules! auth_error {
    ($msg:expr) => {
        $crate::error::GatewayError::unauthorized($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::GatewayError::unauthorized(format!($fmt, $($arg)*))
    };
}

/// Create a transport error.
#[macro_export]
macro_rules! transport_error {
    ($msg:expr) => {
        $crate::error::GatewayError::transport($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::GatewayError::transport(format!($fmt, $($arg)*))
    };
}

/// Create an internal error.
#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::error::GatewayError::internal($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::GatewayError::internal(format!($fmt, $($arg)*))
    };
}

/// Ensure a condition holds, otherwise return a configuration error.
#[macro_export]
macro_rules! ensure_config {
    ($cond:expr, $msg:expr) => {
        if !($cond) {
            return Err($crate::config_error!($msg));
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !($cond) {
            return Err($crate::config_error!($fmt, $($arg)*));
        }
    };
}
