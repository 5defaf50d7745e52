//! Client-side display math.
//!
//! Nothing here computes finances; it only shapes server numbers for display:
//! progress bars, currency strings and category styling.

pub mod category;
pub mod money;
pub mod progress;

pub use category::CategoryStyle;
pub use money::{format_compact, format_money};
pub use progress::{Progress, ProgressStatus};
