//! Data source implementations

pub mod environment;
pub mod global_field;
pub mod locale;
pub mod locales;

pub use environment::EnvironmentDataSource;
pub use global_field::GlobalFieldDataSource;
pub use locale::LocaleDataSource;
pub use locales::LocalesDataSource;
