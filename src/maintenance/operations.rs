use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::maintenance::results::SweepReport;
use crate::storage::filesystem::directory_exists;
use crate::storage::{ASSET_DIR, DOCUMENT_DIR, TEMP_SUFFIX};

fn is_stale(path: &Path, older_than: Duration, now: SystemTime) -> io::Result<bool> {
    let modified = fs::metadata(path)?.modified()?;
    let age = now.duration_since(modified).unwrap_or_default();
    Ok(age >= older_than)
}

fn sweep_dir(dir: &Path, older_than: Duration, now: SystemTime, report: &mut SweepReport) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot scan {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_temp = entry.file_name().to_string_lossy().ends_with(TEMP_SUFFIX);
        if !is_temp || !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        match is_stale(&path, older_than, now) {
            Ok(false) => debug!("Keeping fresh temp file {}", path.display()),
            Ok(true) => match fs::remove_file(&path) {
                Ok(()) => report.removed.push(path),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!("Failed to remove stale temp file {}: {}", path.display(), e);
                    report.failed.push(path);
                }
            },
            Err(e) => {
                warn!("Cannot stat {}: {}", path.display(), e);
                report.failed.push(path);
            }
        }
    }
}

/// Remove `*.tmp` files older than `older_than` from every tenant's
/// `document/` and `asset/` directories under `root`
pub fn sweep_stale_temp_files(root: &Path, older_than: Duration) -> io::Result<SweepReport> {
    let now = SystemTime::now();
    let mut report = SweepReport::default();

    for tenant in fs::read_dir(root)? {
        let tenant = tenant?;
        if !tenant.file_type()?.is_dir() {
            continue;
        }
        for sub in [DOCUMENT_DIR, ASSET_DIR] {
            let dir = tenant.path().join(sub);
            if directory_exists(&dir) {
                sweep_dir(&dir, older_than, now, &mut report);
            }
        }
    }

    info!(
        "Temp sweep under {}: {} removed, {} failed",
        root.display(),
        report.removed.len(),
        report.failed.len()
    );
    Ok(report)
}
