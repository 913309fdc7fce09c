pub mod error;
pub mod series;
pub mod snapshot;
pub mod summary;

pub use error::ReportError;
pub use series::{ChartPoint, DemandLevel, chart_series, demand_distribution};
pub use snapshot::{BidRecord, Restored, SNAPSHOT_VERSION, Snapshot, StateSummary};
pub use summary::{AuctionSummary, BidLine};
