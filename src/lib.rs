//! Built-in method namespaces served by the `jrpcd` binary.

pub mod sample;
