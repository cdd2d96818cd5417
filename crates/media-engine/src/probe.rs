// FILE: crates/media-engine/src/probe.rs
//! File duration probing with Symphonia

use crate::error::{EngineError, EngineResult};
use std::fs::File;
use std::path::Path;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Reads the container header of `path` and returns its duration in seconds.
pub fn probe_duration(path: &Path) -> EngineResult<f64> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| probe_error(path, format!("{:?}", e)))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| probe_error(path, "no default track"))?;
    let params = &track.codec_params;

    match (params.n_frames, params.time_base) {
        (Some(n_frames), Some(tb)) => {
            let time = tb.calc_time(n_frames);
            Ok(time.seconds as f64 + time.frac)
        }
        _ => Err(probe_error(path, "duration not reported")),
    }
}

/// Probes every file; `None` if any one of them cannot be measured
pub fn probe_all(files: &[impl AsRef<Path>]) -> Option<Vec<f64>> {
    let mut durations = Vec::with_capacity(files.len());
    for file in files {
        match probe_duration(file.as_ref()) {
            Ok(d) => durations.push(d),
            Err(e) => {
                log::warn!("{}", e);
                return None;
            }
        }
    }
    Some(durations)
}

fn probe_error(path: &Path, reason: impl Into<String>) -> EngineError {
    EngineError::Probe {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}
