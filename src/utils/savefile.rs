//! Save-file naming for exports.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Timestamp format appended to export file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Build `<stem>_<timestamp>.<ext>` next to the template path.
///
/// ```
/// use chrono::NaiveDate;
/// use proquest_results::utils::timestamped_path;
///
/// let at = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(7, 5, 1).unwrap();
/// let path = timestamped_path("out/results.csv", at);
/// assert_eq!(path.to_str(), Some("out/results_2024-03-09-07-05-01.csv"));
/// ```
pub fn timestamped_path(template: impl AsRef<Path>, at: NaiveDateTime) -> PathBuf {
    let template = template.as_ref();
    let stem = template
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut name = format!("{}_{}", stem, at.format(TIMESTAMP_FORMAT));
    if let Some(ext) = template.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }

    template.with_file_name(name)
}
