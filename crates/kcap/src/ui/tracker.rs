use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use kcap_fetch::Tracker;
use once_cell::sync::Lazy;

/// ≈125ms between redraws.
const REFRESH_HZ: u8 = 8;

const PB_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

const SPINNER_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {bytes} ({bytes_per_sec})";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

static SPINNER_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(SPINNER_STYLE)
        .ok()
        .map(|style| style.tick_chars(TICK))
});

/// Transfer bar on stderr. Starts as a spinner and becomes a bar once the
/// total is known.
pub struct ProgressTracker {
    pb: ProgressBar,
}

impl ProgressTracker {
    pub fn new(prefix: &str) -> Self {
        let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr_with_hz(REFRESH_HZ));
        if let Some(style) = SPINNER_TEMPLATE.as_ref() {
            pb.set_style(style.clone());
        }
        pb.set_prefix(prefix.to_owned());
        Self { pb }
    }
}

impl Tracker for ProgressTracker {
    fn set_length(&self, len: u64) {
        if let Some(style) = PB_TEMPLATE.as_ref() {
            self.pb.set_style(style.clone());
        }
        self.pb.set_length(len);
    }

    fn set_position(&self, pos: u64) { self.pb.set_position(pos); }

    fn finish(&self) { self.pb.finish_and_clear(); }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl ProgressTracker {
        fn hidden() -> Self {
            Self {
                pb: ProgressBar::hidden(),
            }
        }

        fn position(&self) -> u64 { self.pb.position() }
    }

    #[test]
    fn templates_parse() {
        assert!(PB_TEMPLATE.is_some());
        assert!(SPINNER_TEMPLATE.is_some());
    }

    #[test]
    fn hidden_tracker_follows_positions() {
        let tracker = ProgressTracker::hidden();
        tracker.set_length(10);
        tracker.set_position(4);
        assert_eq!(tracker.position(), 4);
        tracker.finish();
    }
}
