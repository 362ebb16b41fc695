//! Wizard step panels, one per step

mod directories;
mod filters;
mod naming;
mod organise;
mod processing;

pub use directories::DirectoriesPanel;
pub use filters::FiltersPanel;
pub use naming::NamingPanel;
pub use organise::OrganisePanel;
pub use processing::ProcessingPanel;
