use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extensions of detached-label payloads, compared case-insensitively
const DATA_EXTENSIONS: [&str; 2] = ["img", "dat"];

/// Label files are never conversion inputs
const LABEL_EXTENSION: &str = "xml";

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

/// Mission raw products such as `.2BL` or `.2CL`: a `.` somewhere before a
/// final uppercase `L`.
fn has_raw_product_suffix(name: &str) -> bool {
    name.strip_suffix('L').is_some_and(|rest| rest.contains('.'))
}

pub fn is_pds_data_file(path: &Path) -> bool {
    if has_extension(path, LABEL_EXTENSION) {
        return false;
    }
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    has_raw_product_suffix(name) || DATA_EXTENSIONS.iter().any(|ext| has_extension(path, ext))
}

/// Recursively collects PDS4 data files under `root`, sorted and deduplicated.
///
/// Entries that cannot be read are skipped with a warning. Only entries
/// below `root` are considered, so a `root` that is itself a file yields nothing.
pub fn discover(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_pds_data_file(path))
        .collect();

    files.sort();
    files.dedup();

    debug!("Discovered {} PDS files under {}", files.len(), root.display());
    files
}
