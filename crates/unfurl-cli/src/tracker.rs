use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use unfurl_fetch::Progress;

const BAR_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

const SPINNER_STYLE: &str =
    "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {bytes} ({bytes_per_sec})";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const BAR_CHARS: &str = "█▓▒░  ";

static BAR_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(BAR_STYLE)
        .ok()
        .map(|style| style.tick_chars(TICK).progress_chars(BAR_CHARS))
});

static SPINNER_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(SPINNER_STYLE)
        .ok()
        .map(|style| style.tick_chars(TICK))
});

/// Terminal progress for a single download. The bar is created lazily on the
/// first report, once the server has told us whether the length is known.
pub struct DownloadTracker {
    prefix: String,
    pb: Option<ProgressBar>,
}

impl DownloadTracker {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            pb: None,
        }
    }

    pub fn update(&mut self, progress: &Progress) {
        let pb = self.pb.get_or_insert_with(|| {
            let (pb, style) = match progress.total_size {
                Some(len) => (ProgressBar::new(len), BAR_TEMPLATE.as_ref()),
                None => (ProgressBar::new_spinner(), SPINNER_TEMPLATE.as_ref()),
            };
            let pb = match style {
                Some(style) => pb.with_style(style.clone()),
                None => pb,
            };
            pb.set_prefix(self.prefix.clone());
            pb
        });
        pb.set_position(progress.bytes_so_far);
    }

    pub fn finish(self, msg: &str) {
        if let Some(pb) = self.pb {
            pb.finish_with_message(msg.to_string());
        }
    }

    pub fn abandon(self) {
        if let Some(pb) = self.pb {
            pb.abandon();
        }
    }
}
