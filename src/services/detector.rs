//! Issue detector.
//!
//! Classifies the supervised process each tick: crashed, stuck, or fine.
//! The checks are an ordered policy (crash detection always runs before
//! stuck detection) and the stuck heuristic is purely observational: the
//! newest screenshot in the watched directory standing in for "the bot is
//! doing something".

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::domain::models::{DetectorConfig, Issue};

/// Stateful classifier over supervisor liveness and the screenshot
/// directory. Keeps only what the stuck heuristic needs between ticks:
/// the last observed screenshot path and when it was first seen.
pub struct IssueDetector {
    screenshot_dir: PathBuf,
    stuck_threshold: Duration,
    last_screenshot: Option<PathBuf>,
    last_change_at: Option<Instant>,
}

impl IssueDetector {
    /// Create a detector watching the configured screenshot directory.
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            screenshot_dir: PathBuf::from(&config.screenshot_dir),
            stuck_threshold: Duration::from_secs(config.stuck_threshold_secs),
            last_screenshot: None,
            last_change_at: None,
        }
    }

    /// Classify the current state. `running` and `uptime_secs` come from
    /// the supervisor; the screenshot directory is read here.
    pub fn check(&mut self, running: bool, uptime_secs: u64) -> Option<Issue> {
        let latest = latest_screenshot(&self.screenshot_dir);
        self.check_at(running, uptime_secs, latest, Instant::now())
    }

    /// Clocked core of `check`. Policy, in order:
    /// 1. Not running → crash, regardless of screenshot state.
    /// 2. Newest screenshot unchanged past the threshold → stuck.
    /// 3. No screenshots at all → warm-up, not an issue.
    fn check_at(
        &mut self,
        running: bool,
        uptime_secs: u64,
        latest: Option<PathBuf>,
        now: Instant,
    ) -> Option<Issue> {
        if !running {
            return Some(Issue::Crash { uptime_secs });
        }

        let latest = latest?;

        if self.last_screenshot.as_deref() == Some(latest.as_path()) {
            let first_seen = *self.last_change_at.get_or_insert(now);
            if now.duration_since(first_seen) > self.stuck_threshold {
                return Some(Issue::Stuck { screenshot: latest });
            }
        } else {
            self.last_screenshot = Some(latest);
            self.last_change_at = Some(now);
        }

        None
    }
}

/// Most-recently-modified `.png` in `dir`, if any. Read failures are
/// logged and treated as "no screenshots".
fn latest_screenshot(dir: &Path) -> Option<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        // A directory that doesn't exist yet is warm-up, not a failure.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read screenshot directory");
            return None;
        }
    };

    entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
        .max_by_key(|p| {
            p.metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(threshold_secs: u64) -> IssueDetector {
        IssueDetector::new(&DetectorConfig {
            screenshot_dir: "unused".to_string(),
            stuck_threshold_secs: threshold_secs,
        })
    }

    #[test]
    fn test_crash_has_priority_over_screenshots() {
        let mut detector = detector(300);
        let now = Instant::now();
        let shot = Some(PathBuf::from("a.png"));

        let issue = detector.check_at(false, 42, shot, now);
        assert_eq!(issue, Some(Issue::Crash { uptime_secs: 42 }));

        // Crash even with zero screenshots
        let issue = detector.check_at(false, 7, None, now);
        assert_eq!(issue, Some(Issue::Crash { uptime_secs: 7 }));
    }

    #[test]
    fn test_no_screenshots_is_not_stuck() {
        let mut detector = detector(300);
        let t0 = Instant::now();

        assert_eq!(detector.check_at(true, 10, None, t0), None);
        assert_eq!(
            detector.check_at(true, 1000, None, t0 + Duration::from_secs(600)),
            None
        );
    }

    #[test]
    fn test_stuck_only_after_threshold() {
        let mut detector = detector(300);
        let t0 = Instant::now();
        let shot = PathBuf::from("same.png");

        // First sighting establishes the baseline
        assert_eq!(detector.check_at(true, 10, Some(shot.clone()), t0), None);

        // Unchanged at t=100s: under the threshold, no issue
        assert_eq!(
            detector.check_at(true, 110, Some(shot.clone()), t0 + Duration::from_secs(100)),
            None
        );

        // Unchanged at t=301s: stuck
        let issue = detector.check_at(true, 311, Some(shot.clone()), t0 + Duration::from_secs(301));
        assert_eq!(issue, Some(Issue::Stuck { screenshot: shot }));
    }

    #[test]
    fn test_new_screenshot_resets_the_clock() {
        let mut detector = detector(300);
        let t0 = Instant::now();

        assert_eq!(
            detector.check_at(true, 10, Some(PathBuf::from("a.png")), t0),
            None
        );

        // A different file arrives just before the threshold
        let t1 = t0 + Duration::from_secs(299);
        assert_eq!(
            detector.check_at(true, 309, Some(PathBuf::from("b.png")), t1),
            None
        );

        // b.png unchanged for 299s measured from t1: still fine
        let t2 = t1 + Duration::from_secs(299);
        assert_eq!(
            detector.check_at(true, 608, Some(PathBuf::from("b.png")), t2),
            None
        );

        // ...and stuck once its own threshold passes
        let t3 = t1 + Duration::from_secs(301);
        assert_eq!(
            detector.check_at(true, 610, Some(PathBuf::from("b.png")), t3),
            Some(Issue::Stuck {
                screenshot: PathBuf::from("b.png")
            })
        );
    }

    #[test]
    fn test_latest_screenshot_scan() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(latest_screenshot(dir.path()), None);

        std::fs::write(dir.path().join("old.png"), b"x").unwrap();
        std::fs::write(dir.path().join("ignored.txt"), b"x").unwrap();
        // Ensure a later mtime on the second screenshot
        std::thread::sleep(Duration::from_millis(20));
        std::fs::write(dir.path().join("new.png"), b"x").unwrap();

        let latest = latest_screenshot(dir.path()).unwrap();
        assert_eq!(latest.file_name().unwrap(), "new.png");
    }

    #[test]
    fn test_missing_directory_is_not_an_issue() {
        assert_eq!(latest_screenshot(Path::new("/nonexistent/vigil")), None);
    }
}
