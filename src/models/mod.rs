pub mod block;
pub mod cost;
pub mod hook;
pub mod message;

pub use block::{PercentSource, Projection, QuotaBlock, TokenLimitStatus};
pub use cost::{CostRow, CostSnapshot};
pub use hook::HookJson;
pub use message::{TranscriptLine, UsageRecord};
