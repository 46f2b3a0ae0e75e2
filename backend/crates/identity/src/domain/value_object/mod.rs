//! Value Object Module

pub mod email;
pub mod ids;
pub mod otp_code;
pub mod password;
pub mod username;
