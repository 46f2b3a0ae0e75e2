//! Entity Module

pub mod account;
pub mod otp;
pub mod session;
