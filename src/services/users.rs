use std::sync::Arc;

use crate::error::RequestResult;
use crate::http_client::ApiClient;
use crate::models::account::{ProfileUpdate, RoleChange, RoleChangeResponse, User};
use crate::session::UserRole;

#[derive(Clone)]
pub struct UserService {
    api: Arc<ApiClient>,
}

impl UserService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> RequestResult<Vec<User>> {
        self.api.get("/api/users/").await
    }

    pub async fn get(&self, user_id: u64) -> RequestResult<User> {
        self.api.get(&format!("/api/users/{}/", user_id)).await
    }

    pub async fn change_role(&self, user_id: u64, role: UserRole) -> RequestResult<User> {
        self.api
            .patch(
                &format!("/api/users/{}/change_role/", user_id),
                &RoleChange {
                    role: role_name(role),
                },
            )
            .await
    }

    pub async fn me(&self, user_id: u64) -> RequestResult<User> {
        self.api.get(&format!("/api/users/me/{}/", user_id)).await
    }

    pub async fn update_me(&self, user_id: u64, update: &ProfileUpdate) -> RequestResult<User> {
        self.api
            .put(&format!("/api/users/me/{}/", user_id), update)
            .await
    }

    pub async fn patch_me(&self, user_id: u64, update: &ProfileUpdate) -> RequestResult<User> {
        self.api
            .patch(&format!("/api/users/me/{}/", user_id), update)
            .await
    }
}

/// Role listings and the admin role switch
#[derive(Clone)]
pub struct RoleService {
    api: Arc<ApiClient>,
}

impl RoleService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn users_with_roles(&self) -> RequestResult<Vec<User>> {
        self.api.get("/api/users/roles/").await
    }

    pub async fn translators(&self) -> RequestResult<Vec<User>> {
        self.api.get("/api/users/translators/").await
    }

    pub async fn clients(&self) -> RequestResult<Vec<User>> {
        self.api.get("/api/users/clients/").await
    }

    pub async fn admins(&self) -> RequestResult<Vec<User>> {
        self.api.get("/api/users/admins/").await
    }

    pub async fn change_role(
        &self,
        user_id: u64,
        role: UserRole,
    ) -> RequestResult<RoleChangeResponse> {
        self.api
            .patch(
                &format!("/api/users/{}/role/", user_id),
                &RoleChange {
                    role: role_name(role),
                },
            )
            .await
    }
}

fn role_name(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "admin",
        UserRole::Translator => "translator",
        UserRole::Client => "client",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_name_matches_wire_format() {
        for role in [UserRole::Admin, UserRole::Translator, UserRole::Client] {
            let wire = serde_json::to_value(role).unwrap();
            assert_eq!(wire, role_name(role));
        }
    }
}
