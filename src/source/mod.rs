pub mod asset;
pub mod record;

pub use asset::{fetch_asset, AssetLocation};
pub use record::{fetch_record_pdf, HttpRecordService, RecordService};
