/// Per-request settings for [`retrieve`](crate::retrieve) and
/// [`download_file`](crate::download_file).
///
/// # Examples
///
/// ```
/// use unfurl_fetch::FetchOptions;
///
/// let options = FetchOptions::default()
///     .header("Accept", "application/zip")
///     .header("Authorization", "Bearer token");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Extra headers sent with every request. The user agent is configured on
    /// the client, see [`ClientConfig`](crate::ClientConfig).
    pub headers: Vec<(String, String)>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header, replacing an earlier one with the same name.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&key));
        self.headers.push((key, value.into()));
        self
    }
}
