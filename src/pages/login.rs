//! Login and registration forms.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use crate::net::types::Registration;
use crate::state::ui::FieldId;

pub const LOGIN_FIELDS: [FieldId; 2] = [FieldId::LoginUsername, FieldId::LoginPassword];
pub const REGISTER_FIELDS: [FieldId; 3] = [FieldId::RegUsername, FieldId::RegEmail, FieldId::RegPassword];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl From<&RegisterForm> for Registration {
    fn from(form: &RegisterForm) -> Self {
        Self { username: form.username.clone(), email: form.email.clone(), password: form.password.clone() }
    }
}
