//! Client test invocation against a live cluster

pub mod invoker;

pub use invoker::{TestInvoker, TestOutcome, TestReport, run_client_tests};
