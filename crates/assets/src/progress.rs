//! Byte progress of a running fetch

use std::io::{self, Read};

const CHUNK_SIZE: usize = 64 * 1024;

/// Bytes received so far and the expected total, when the source knows it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl LoadProgress {
    /// `loaded / total`, or `None` when the total is unknown or zero
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some(self.loaded as f64 / total as f64),
            _ => None,
        }
    }

    /// Whole percent reached, used to throttle progress logging
    pub fn whole_percent(&self) -> Option<u64> {
        self.fraction().map(|f| (f * 100.0).floor() as u64)
    }
}

/// Read `reader` to the end, reporting progress after every chunk.
///
/// # Errors
///
/// Returns the first read error other than [`io::ErrorKind::Interrupted`].
pub fn read_with_progress<R: Read>(
    mut reader: R,
    total: Option<u64>,
    on_progress: &mut dyn FnMut(LoadProgress),
) -> io::Result<Vec<u8>> {
    let capacity = total.and_then(|t| usize::try_from(t).ok()).unwrap_or(0);
    let mut bytes = Vec::with_capacity(capacity);
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        bytes.extend_from_slice(&chunk[..n]);
        on_progress(LoadProgress {
            loaded: bytes.len() as u64,
            total,
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_every_chunk_up_to_total() {
        let data = vec![7u8; CHUNK_SIZE * 2 + 10];
        let mut seen = Vec::new();
        let bytes = read_with_progress(&data[..], Some(data.len() as u64), &mut |p| seen.push(p)).unwrap();

        assert_eq!(bytes, data);
        assert_eq!(seen.len(), 3);
        assert_eq!(seen.last().unwrap().fraction(), Some(1.0));
        assert!(seen.windows(2).all(|w| w[0].loaded < w[1].loaded));
    }

    #[test]
    fn unknown_total_has_no_fraction() {
        let p = LoadProgress { loaded: 10, total: None };
        assert_eq!(p.fraction(), None);
        assert_eq!(LoadProgress { loaded: 0, total: Some(0) }.whole_percent(), None);
        assert_eq!(LoadProgress { loaded: 1, total: Some(3) }.whole_percent(), Some(33));
    }
}
