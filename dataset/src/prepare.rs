//! Offline preparation of augmentation sources.

use std::path::Path;

use sslforslr_audio::{read_wav, write_wav};
use tracing::{debug, info};

use crate::error::{DatasetError, Result};
use crate::walk::find_wavs;

/// Default MUSAN segment length and stride, in seconds.
pub const MUSAN_SEGMENT_SECS: f64 = 8.0;

/// Path components below the MUSAN root: category, source, file.
const MUSAN_DEPTH: usize = 3;

/// Cuts every `<category>/<source>/<file>.wav` under `input` into
/// fixed-length segments under `output`. WAVs at any other depth are ignored.
///
/// Segments start every `stride_secs` and last `length_secs`. A segment is
/// only written if at least one more sample follows it. The directory layout
/// is mirrored and each segment is named `<stem>_<start_secs:05>.wav`. The
/// source tree is left untouched. Returns the number of segments written.
pub fn split_musan(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    length_secs: f64,
    stride_secs: f64,
) -> Result<usize> {
    let input = input.as_ref();
    let output = output.as_ref();
    if !(length_secs > 0.0 && stride_secs > 0.0) {
        return Err(DatasetError::Config(format!(
            "segment length and stride must be positive, got {length_secs} / {stride_secs}"
        )));
    }

    let files: Vec<_> = find_wavs(input)?
        .into_iter()
        .filter(|path| {
            path.strip_prefix(input)
                .is_ok_and(|rel| rel.components().count() == MUSAN_DEPTH)
        })
        .collect();
    info!(input = %input.display(), files = files.len(), "splitting audio");

    let mut written = 0;
    for path in files {
        let pcm = read_wav(&path)?;
        let sr = pcm.sample_rate;
        let length = (length_secs * sr as f64) as usize;
        let stride = ((stride_secs * sr as f64) as usize).max(1);
        if length == 0 || pcm.len() <= length {
            debug!(path = %path.display(), "shorter than one segment, skipped");
            continue;
        }

        let rel = path.strip_prefix(input).unwrap_or(&path);
        let dir = output.join(rel.parent().unwrap_or(Path::new("")));
        std::fs::create_dir_all(&dir).map_err(|e| DatasetError::io(&dir, e))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        for start in (0..pcm.len() - length).step_by(stride) {
            let secs = start / sr as usize;
            let target = dir.join(format!("{stem}_{secs:05}.wav"));
            write_wav(&target, &pcm.samples[start..start + length], sr)?;
            written += 1;
        }
    }

    info!(output = %output.display(), segments = written, "split done");
    Ok(written)
}
