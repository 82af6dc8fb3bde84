//! MUSAN preparation.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use sslforslr_dataset::prepare::{split_musan, MUSAN_SEGMENT_SECS};

use super::{output_result, print_success};
use crate::Cli;

/// Cut every WAV under INPUT into segments written under OUTPUT.
#[derive(Args)]
pub struct SplitMusanCommand {
    /// MUSAN root (`<category>/<source>/<file>.wav`)
    input: PathBuf,

    /// Output root, mirrors the input layout
    output: PathBuf,

    /// Segment length in seconds
    #[arg(long, default_value_t = MUSAN_SEGMENT_SECS)]
    length: f64,

    /// Distance between segment starts in seconds
    #[arg(long, default_value_t = MUSAN_SEGMENT_SECS)]
    stride: f64,
}

#[derive(Serialize)]
struct SplitSummary {
    output: PathBuf,
    segments: usize,
}

impl SplitMusanCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let segments = split_musan(&self.input, &self.output, self.length, self.stride)?;
        print_success(&format!(
            "wrote {} segments to {}",
            segments,
            self.output.display()
        ));
        output_result(
            &SplitSummary {
                output: self.output.clone(),
                segments,
            },
            cli.json,
        )
    }
}
