pub mod catalog;
pub mod error;
pub mod selection;
pub mod settings;
pub mod student;
pub mod unavailable;

pub use catalog::CatalogService;
pub use error::ServiceError;
pub use selection::SelectionService;
pub use settings::SettingsService;
pub use student::StudentService;
pub use unavailable::UnavailableTermsService;
