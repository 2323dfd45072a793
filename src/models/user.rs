use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::{Profile, ProfileChanges, User};

pub const PASSWORD_MISMATCH: &str = "Password confirmation must match Password";

/// Body of `POST /users` and `PUT /users/{id}`. The email doubles as the username.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserPayload {
    #[validate(length(min = 1, max = 150))]
    pub first_name: String,
    #[validate(length(min = 1, max = 150))]
    pub last_name: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    pub password_confirmation: String,
    #[validate(length(min = 8, max = 10))]
    pub phone: String,
    #[validate(length(min = 1, max = 32))]
    pub role: String,
    pub phone_country: Option<i32>,
    pub user_type: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserPatch {
    #[validate(length(min = 1, max = 150))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub last_name: Option<String>,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    #[validate(length(min = 8, max = 10))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub phone_country: Option<Option<i32>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub user_type: Option<Option<i32>>,
}

impl From<UserPayload> for UserPatch {
    fn from(u: UserPayload) -> Self {
        Self {
            first_name: Some(u.first_name),
            last_name: Some(u.last_name),
            email: Some(u.email),
            password: Some(u.password),
            password_confirmation: Some(u.password_confirmation),
            phone: Some(u.phone),
            role: Some(u.role),
            phone_country: Some(u.phone_country),
            user_type: Some(u.user_type),
        }
    }
}

impl UserPatch {
    /// A new password is only accepted together with an equal confirmation.
    pub fn password_confirmed(&self) -> bool {
        match &self.password {
            Some(password) => self.password_confirmation.as_ref() == Some(password),
            None => true,
        }
    }

    pub fn profile_changes(&self) -> ProfileChanges {
        ProfileChanges {
            role: self.role.clone(),
            phone: self.phone.clone(),
            phone_country_id: self.phone_country,
            user_type_id: self.user_type,
        }
    }
}

/// A user and its profile merged into one object; the password never leaves.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub phone_country: Option<i32>,
    pub user_type: Option<i32>,
}

impl From<(User, Profile)> for UserView {
    fn from((user, profile): (User, Profile)) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: profile.phone,
            role: profile.role,
            phone_country: profile.phone_country_id,
            user_type: profile.user_type_id,
        }
    }
}
