/// Byte counts reported while a response body is written out.
///
/// The first report for a download always has `bytes_so_far == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub bytes_so_far: u64,
    /// Size of the read buffer, the largest step between two reports.
    pub block_size: usize,
    /// Declared length of the body, `None` when the server did not send one.
    pub total_size: Option<u64>,
}

impl Progress {
    /// Completed fraction in `0.0..=1.0`, when the total is known.
    pub fn fraction(&self) -> Option<f64> {
        match self.total_size {
            Some(0) => Some(1.0),
            Some(total) => Some((self.bytes_so_far as f64 / total as f64).min(1.0)),
            None => None,
        }
    }
}
