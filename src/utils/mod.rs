pub mod constants;
pub mod filename;
pub mod format;
pub mod progress;

pub use constants::*;
pub use filename::{report_csv_filename, report_image_filename, yesterday};
pub use format::format_value;
pub use progress::ProgressReporter;
