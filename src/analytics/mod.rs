//! Wardrobe Analytics
//!
//! Pure aggregations over a user's items and wear history. Nothing here
//! touches storage; callers load the documents and pass slices in.
//!
//! - **dashboard**: totals, breakdowns, most-worn and neglected lists, timeline
//! - **cpw**: cost-per-wear table

pub mod cpw;
pub mod dashboard;

pub use cpw::{average_cpw, cpw_table, CpwRow};
pub use dashboard::{
    build_dashboard, wear_timeline, CategoryBreakdown, ColorCount, Dashboard, DailyWears, ItemSummary,
};
