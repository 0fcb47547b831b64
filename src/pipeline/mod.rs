mod export;
mod upload;

pub use export::{ExportCallback, ExportEvent, ExportOutcome, ExportPipeline};
pub use upload::{parse_connection, UploadPlan};
