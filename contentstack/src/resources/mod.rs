//! Resource implementations

pub mod default_locale;
pub mod environment;
pub mod global_field;
pub mod locale;

pub use default_locale::DefaultLocaleResource;
pub use environment::EnvironmentResource;
pub use global_field::GlobalFieldResource;
pub use locale::LocaleResource;
