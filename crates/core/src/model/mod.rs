pub mod ids;
pub mod item;
pub mod report;
pub mod section;

pub use ids::{ItemIndex, ParseIdError, SectionNumber};
pub use item::{Item, ItemError};
pub use report::{CompletionSplit, CourseOverview, MonthlyTotal, monthly_totals};
pub use section::{Section, SectionError, SectionSummary};
