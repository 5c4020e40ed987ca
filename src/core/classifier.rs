use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const SAMPLE_SIZE: usize = 512;
const SUSPICIOUS_PERCENT: usize = 10;
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Reads a leading sample of the file and classifies it.
///
/// A file that cannot be opened or read is reported as binary so that the
/// caller excludes it instead of failing the walk.
pub fn is_binary_file(path: &Path) -> bool {
    match read_sample(path) {
        Ok(sample) => is_binary_bytes(&sample),
        Err(e) => {
            debug!("Cannot classify {}: {}", path.display(), e);
            true
        }
    }
}

fn read_sample(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut sample = Vec::with_capacity(SAMPLE_SIZE);
    file.take(SAMPLE_SIZE as u64).read_to_end(&mut sample)?;
    Ok(sample)
}

pub fn is_binary_bytes(bytes: &[u8]) -> bool {
    if bytes.is_empty() || bytes.starts_with(UTF8_BOM) {
        return false;
    }
    if bytes.starts_with(b"%PDF-") {
        return true;
    }

    let mut suspicious = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        if b == 0 {
            return true;
        }

        // Tab, newlines and the other format controls (7..=14) count as text.
        if (b < 7 || b > 14) && (b < 32 || b > 127) {
            match utf8_sequence_len(&bytes[i..]) {
                Some(len) => {
                    i += len;
                    continue;
                }
                None => suspicious += 1,
            }
        }

        i += 1;
        if i >= 32 && suspicious * 100 / i > SUSPICIOUS_PERCENT {
            return true;
        }
    }

    suspicious * 100 / bytes.len() > SUSPICIOUS_PERCENT
}

/// Length of the well-formed multi-byte UTF-8 sequence at the start of `bytes`.
/// A sequence cut off by the end of the sample is accepted as-is.
fn utf8_sequence_len(bytes: &[u8]) -> Option<usize> {
    let width = match bytes[0] {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return None,
    };

    if bytes.len() < width {
        let tail_ok = bytes[1..].iter().all(|b| (0x80..=0xBF).contains(b));
        return tail_ok.then_some(bytes.len());
    }

    std::str::from_utf8(&bytes[..width]).ok().map(|_| width)
}
