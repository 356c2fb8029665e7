pub mod analytics;
pub mod blog;
pub mod contact;
pub mod newsletter;
pub mod service_request;
pub mod settings;
pub mod visitor;
