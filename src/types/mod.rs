pub mod analysis;
pub mod response;

pub use analysis::{AnalysisRecord, Course, Items, OrderedMap, Score};
pub use response::{HistoryEntry, UploadOutcome};
