pub mod csv_writer;
pub mod report_publisher;
pub mod template_renderer;

pub use csv_writer::CsvWriter;
pub use report_publisher::{publish_outputs, RenderJob, ReportPublisher};
pub use template_renderer::TemplateRenderer;
