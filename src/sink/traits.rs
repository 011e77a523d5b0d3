//! Sink trait

/// Durable destination for downloaded payloads
///
/// Implementations report failure through the return value instead of an
/// error so that every persistence failure counts against the error budget
/// the same way. Whether an existing target may be replaced is the sink's
/// own policy.
pub trait Sink {
    /// Persists `payload` under the name `target` (no extension)
    ///
    /// # Returns
    ///
    /// * `true` - The payload is durably stored
    /// * `false` - Nothing usable was stored; the cause has been logged
    fn persist(&mut self, payload: &str, target: &str) -> bool;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn persist(&mut self, payload: &str, target: &str) -> bool {
        (**self).persist(payload, target)
    }
}
