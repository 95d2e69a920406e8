//! External process execution for the encoder service.
//!
//! This crate provides:
//! - A command runner that captures exit code, stdout and stderr
//! - Argument-vector command building with secret redaction for logs
//! - The encoder invoker used by task requests

pub mod command;
pub mod encoder;
pub mod error;

pub use command::{check_program, CommandLine, CommandOutput, CommandRunner};
pub use encoder::{parse_arguments, EncoderInvoker, DEFAULT_ENCODER};
pub use error::{MediaError, MediaResult};
