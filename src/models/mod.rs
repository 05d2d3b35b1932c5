//! Domain models: granularities, series records, fundamentals, profile and
//! options documents, and display-name rewriting.

mod fundamentals;
mod granularity;
mod options;
mod profile;
mod rename;
mod series;

pub use fundamentals::{FundamentalsPoint, FundamentalsRecord, LAST_UPDATE_FORMAT, METRIC_TYPES};
pub use granularity::Granularity;
pub use options::{OptionContract, OptionSide};
pub use profile::{ProfileRecord, PROFILE_MODULES};
pub use rename::display_name;
pub use series::{
    DividendEvent, GapKind, GapRequest, InstrumentMeta, NormalizedSeries, SplitEvent,
    TimeSeriesRecord,
};
