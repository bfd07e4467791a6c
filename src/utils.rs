use std::{fs, io};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

/// Reads a class-name file: one name per line, blank lines skipped.
pub(crate) fn file_to_vec<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
    let file_in = fs::File::open(filename)?;
    let file_reader = BufReader::new(file_in);
    let mut lines = Vec::new();
    for line in file_reader.lines() {
        let line = line?;
        let name = line.trim();
        if !name.is_empty() {
            lines.push(name.to_string());
        }
    }
    Ok(lines)
}

pub(crate) fn trace(l_step: &str, detect: Instant, _detect_elapsed: Duration) -> Duration {
    let elapsed = detect.elapsed();
    log::trace!("TIME | Total={:.2?} | {}={:.2?}", elapsed, l_step, elapsed.saturating_sub(_detect_elapsed));
    elapsed
}
