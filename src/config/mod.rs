//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::PublishConfig;
pub use site::SiteConfig;
