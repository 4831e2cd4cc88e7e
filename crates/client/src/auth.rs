//! Logging in, refreshing tokens and creating accounts
use log::debug;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Client, Error as ClientError, Result};

#[derive(Error, Debug)]
pub enum Error {
    #[error("login failed. check your username and password?")]
    LoginFailed,

    #[error("the session could not be refreshed, please log in again")]
    RefreshRejected,

    #[error("you need to be logged in to do that")]
    NotLoggedIn,
}

/// What kind of account a user has
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Learner,
    Tutor,
    #[default]
    #[serde(other)]
    Other,
}

impl Role {
    /// The path segment used when signing up with this role
    pub fn signup_path(&self) -> Option<&'static str> {
        match self {
            Role::Learner => Some("learner"),
            Role::Tutor => Some("tutor"),
            Role::Other => None,
        }
    }
}

/// Response given by the login endpoint
#[derive(Debug, Deserialize)]
pub struct LoginResp {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// A new token pair, given by the refresh endpoint
#[derive(Deserialize)]
pub struct TokenPair {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(alias = "refreshToken")]
    pub refresh_token: Option<String>,
}

/// The refresh endpoint isn't consistent about wrapping its response
#[derive(Deserialize)]
#[serde(untagged)]
enum RefreshResp {
    Wrapped { data: TokenPair },
    Bare(TokenPair),
}

impl From<RefreshResp> for TokenPair {
    fn from(value: RefreshResp) -> Self {
        match value {
            RefreshResp::Wrapped { data } => data,
            RefreshResp::Bare(t) => t,
        }
    }
}

#[derive(Serialize)]
struct LoginReq<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshReq<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

impl Client {
    /// Exchange a username & password for a token pair
    pub fn login(&self, username: &str, password: &Password) -> Result<LoginResp> {
        debug!("logging in as {}", username);
        self.post(
            "/iam/login/",
            &LoginReq {
                username,
                password: password.as_ref(),
            },
        )
        .map_err(|e| match e {
            ClientError::Network { status, .. } if status.is_client_error() => {
                Error::LoginFailed.into()
            }
            e => e,
        })
    }

    /// Exchange a refresh token for a new token pair
    pub fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair> {
        let resp = self
            .send(
                self.http
                    .post(self.url("/iam/refresh/"))
                    .json(&RefreshReq { refresh_token }),
                false,
            )
            .map_err(|e| match e {
                ClientError::Network { status, .. } if status.is_client_error() => {
                    Error::RefreshRejected.into()
                }
                e => e,
            })?;

        Ok(resp.json::<RefreshResp>()?.into())
    }

    /// Create a new account. The form is validated before anything is sent.
    pub fn signup(&self, role: Role, form: &SignupForm) -> Result<()> {
        form.validate()?;
        let Some(role_path) = role.signup_path() else {
            return Err(ClientError::Validation(
                "accounts can only be created for learners or tutors".to_string(),
            ));
        };

        let url = self.url(&format!("/iam/signup/{}/", role_path));
        let resp = self.send(self.http.post(&url).json(&form.payload()), false)?;
        if resp.status() != StatusCode::CREATED {
            return Err(ClientError::Network {
                status: resp.status(),
                url,
            });
        }

        Ok(())
    }
}

/// Details for creating an account
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: Password,
    pub password_confirm: Password,
}

#[derive(Serialize)]
struct SignupReq<'a> {
    username: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    password: &'a str,
}

impl SignupForm {
    /// Check the form is complete and the passwords match
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty()
            || self.first_name.is_empty()
            || self.last_name.is_empty()
            || self.password.is_empty()
            || self.password_confirm.is_empty()
        {
            return Err(ClientError::Validation(
                "all fields are required".to_string(),
            ));
        }

        if self.password != self.password_confirm {
            return Err(ClientError::Validation(
                "passwords do not match".to_string(),
            ));
        }

        Ok(())
    }

    fn payload(&self) -> SignupReq<'_> {
        SignupReq {
            username: &self.username,
            first_name: &self.first_name,
            last_name: &self.last_name,
            password: self.password.as_ref(),
        }
    }
}

/// A password, wrapped so we don't print it by accident
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Password(String);

impl Password {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, c: char) {
        self.0.push(c);
    }

    pub fn pop(&mut self) -> Option<char> {
        self.0.pop()
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Password (******)")
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Password(value)
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Password(value.to_string())
    }
}

impl AsRef<str> for Password {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// An access token, sent as `Authorization: Bearer ...`. Also wrapped so it doesn't end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Bearer(String);

impl std::fmt::Debug for Bearer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bearer (***)")
    }
}

impl From<String> for Bearer {
    fn from(value: String) -> Self {
        Bearer(value)
    }
}

impl AsRef<str> for Bearer {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
