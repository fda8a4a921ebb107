// Data models for backend resources

pub mod account;
pub mod billing;
pub mod project;

pub use account::{AppSettings, MessageResponse, Notification, User, UserSettings};
pub use billing::{Payment, Quote};
pub use project::{Comment, Document, Project, ProjectDetail};
