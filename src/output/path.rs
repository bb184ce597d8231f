//! Artifact naming

use crate::listing::{ListingSource, RunParameters};
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Formats a run start time as `YYYY-MM-DDThh-mma` (12-hour clock)
pub fn format_stamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%Y-%m-%dT%I-%M%P").to_string()
}

/// Path of the JSON artifact for a run started at `at`
///
/// * category runs: `{data_dir}/{category}_{metric}_{stamp}.json`
/// * country runs: `{data_dir}/country/{country}_{metric}_top-{top}_{stamp}.json`
pub fn artifact_path<Tz>(data_dir: &Path, params: &RunParameters, at: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let stamp = format_stamp(at);
    match &params.source {
        ListingSource::Category(category) => {
            data_dir.join(format!("{}_{}_{}.json", category, params.metric, stamp))
        }
        ListingSource::Country { code, top } => data_dir.join("country").join(format!(
            "{}_{}_top-{}_{}.json",
            code, params.metric, top, stamp
        )),
    }
}
