//! Appraise the sustainability and security risk of a source repository.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use repo_risk_lib::{Host, run};
use std::io::{Write, stderr, stdout};

/// Host bound to the real process streams.
#[derive(Debug, Clone, Copy, Default)]
struct ProcessHost;

#[cfg_attr(coverage_nightly, coverage(off))]
impl Host for ProcessHost {
    fn output(&mut self) -> impl Write {
        stdout().lock()
    }

    fn error(&mut self) -> impl Write {
        stderr().lock()
    }

    fn exit(&mut self, code: i32) {
        let _ = stdout().flush();
        std::process::exit(code);
    }
}

#[tokio::main]
#[cfg_attr(coverage_nightly, coverage(off))]
async fn main() {
    run(&mut ProcessHost, std::env::args_os()).await;
}
