//! Page domain entities.

pub mod model;
pub mod section;

pub use model::{Page, PageInput, PageWithSections, SavePage};
pub use section::{PageSection, SectionInput};
