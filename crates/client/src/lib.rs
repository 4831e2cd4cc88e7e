mod auth;
pub mod categories;
pub mod content;
pub mod course;
pub mod session;
pub mod users;

pub use auth::{Bearer, Error as AuthError, LoginResp, Password, Role, SignupForm, TokenPair};
pub use session::{Authenticator, Session, SessionStore};

use std::time::Duration;

use log::debug;
use reqwest::{
    blocking::{RequestBuilder, Response},
    StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Where the API lives if nothing else is configured
pub const DEFAULT_BASE: &str = "http://localhost:8000";

/// A client, for using the AcadMe API
#[derive(Clone)]
pub struct Client {
    base: String,
    http: reqwest::blocking::Client,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("error authenticating: {}", .0)]
    AuthError(#[from] AuthError),

    #[error("request to {} failed: {}", .url, .status)]
    Network { status: StatusCode, url: String },

    #[error("not authorised, your session may have expired")]
    Unauthorized,

    #[error("{}", .0)]
    Validation(String),

    #[error("http error: {}", .0)]
    HTTPError(#[from] reqwest::Error),

    #[error("io error: {}", .0)]
    IOError(#[from] std::io::Error),

    #[error("serde error: {}", .0)]
    SerdeError(#[from] serde_json::Error),
}

/// Every response body from the API is wrapped in one of these.
#[derive(Deserialize)]
pub(crate) struct Envelope<T> {
    pub(crate) data: T,
}

impl Client {
    /// Create a client talking to the API at `base`, eg `https://acadme.example/api`
    pub fn new(base: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Client {
            base: base.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.send(self.http.get(self.url(path)), false)?;
        parse(resp)
    }

    pub(crate) fn get_authed<T: DeserializeOwned>(&self, path: &str, token: &Bearer) -> Result<T> {
        let resp = self.send(self.http.get(self.url(path)).bearer_auth(token.as_ref()), true)?;
        parse(resp)
    }

    pub(crate) fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self.send(self.http.post(self.url(path)).json(body), false)?;
        parse(resp)
    }

    pub(crate) fn post_authed<T: DeserializeOwned>(&self, path: &str, token: &Bearer) -> Result<T> {
        let resp = self.send(
            self.http.post(self.url(path)).bearer_auth(token.as_ref()),
            true,
        )?;
        parse(resp)
    }

    /// Send a request, turning unsuccessful statuses into errors
    pub(crate) fn send(&self, req: RequestBuilder, authed: bool) -> Result<Response> {
        let resp = req.send()?;
        debug!("{} {}", resp.status(), resp.url());
        check_status(resp.status(), resp.url().as_str(), authed)?;

        Ok(resp)
    }
}

pub(crate) fn check_status(status: StatusCode, url: &str, authed: bool) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else if authed && status == StatusCode::UNAUTHORIZED {
        Err(Error::Unauthorized)
    } else {
        Err(Error::Network {
            status,
            url: url.to_string(),
        })
    }
}

fn parse<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let s = resp.text()?;
    if log::log_enabled!(log::Level::Debug) {
        debug!("response: {}", s);
    }

    parse_envelope(&s)
}

pub(crate) fn parse_envelope<T: DeserializeOwned>(s: &str) -> Result<T> {
    Ok(serde_json::from_str::<Envelope<T>>(s)?.data)
}
