// Service facades
// Thin per-resource wrappers over the API client. Every method returns a
// RequestResult and never panics; callers check the error before the data.

mod account;
mod billing;
mod notifications;
mod projects;
mod users;

use std::sync::Arc;

use crate::http_client::ApiClient;

pub use account::AccountService;
pub use billing::{PaymentService, QuoteService};
pub use notifications::{NotificationService, SettingsService};
pub use projects::{CommentService, ProjectService};
pub use users::{RoleService, UserService};

/// All facades over one shared client
#[derive(Clone)]
pub struct Services {
    pub account: AccountService,
    pub projects: ProjectService,
    pub comments: CommentService,
    pub payments: PaymentService,
    pub quotes: QuoteService,
    pub users: UserService,
    pub roles: RoleService,
    pub notifications: NotificationService,
    pub settings: SettingsService,
}

impl Services {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            account: AccountService::new(api.clone()),
            projects: ProjectService::new(api.clone()),
            comments: CommentService::new(api.clone()),
            payments: PaymentService::new(api.clone()),
            quotes: QuoteService::new(api.clone()),
            users: UserService::new(api.clone()),
            roles: RoleService::new(api.clone()),
            notifications: NotificationService::new(api.clone()),
            settings: SettingsService::new(api),
        }
    }
}
