use chrono::{Duration, Local, NaiveDate};
use std::path::{Path, PathBuf};

use crate::models::Territory;

/// The report always covers the previous calendar day
pub fn yesterday() -> NaiveDate {
    (Local::now() - Duration::days(1)).date_naive()
}

/// Output image name with format: resumo-meteo-{territory}-{YYYYMMDD}.png
pub fn report_image_filename(output_dir: &Path, territory: Territory, date: NaiveDate) -> PathBuf {
    output_dir.join(format!(
        "resumo-meteo-{}-{}.png",
        territory.slug(),
        date.format("%Y%m%d")
    ))
}

/// Leaderboard export name with format: resumo-meteo-{YYYYMMDD}.csv
pub fn report_csv_filename(output_dir: &Path, date: NaiveDate) -> PathBuf {
    output_dir.join(format!("resumo-meteo-{}.csv", date.format("%Y%m%d")))
}
