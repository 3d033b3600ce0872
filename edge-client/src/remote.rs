use anyhow::Context;
use async_trait::async_trait;

use crate::{
    api::{self, Action, Article, AuthToken, Thread, UserId},
    Error, Session,
};

/// The remote server, as seen by the client
#[async_trait]
pub trait Api: Send + Sync {
    async fn fetch_amas(&self) -> Result<Vec<Article>, Error>;
    async fn fetch_feed(&self) -> Result<Vec<Article>, Error>;
    async fn fetch_thread(&self, slug: &str) -> Result<Thread, Error>;
    async fn submit_action(&self, a: Action) -> Result<(), Error>;
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LoginInfo {
    pub host: String,
    pub user: UserId,
    pub token: AuthToken,
}

impl LoginInfo {
    pub fn session(&self) -> Session {
        Session::Authenticated(self.user)
    }
}

pub struct HttpApi {
    client: reqwest::Client,
    host: String,

    /// `None` for anonymous browsing, in which case actions are refused
    login: Option<LoginInfo>,
}

impl HttpApi {
    pub fn new(login: LoginInfo) -> HttpApi {
        HttpApi {
            client: reqwest::Client::new(),
            host: login.host.clone(),
            login: Some(login),
        }
    }

    pub fn anonymous(host: String) -> HttpApi {
        HttpApi {
            client: reqwest::Client::new(),
            host,
            login: None,
        }
    }

    pub fn session(&self) -> Session {
        self.login
            .as_ref()
            .map(|l| l.session())
            .unwrap_or(Session::Unauthenticated)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.host.trim_end_matches('/'), path)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.login {
            Some(l) => req.bearer_auth(l.token.0),
            None => req,
        }
    }

    async fn get<R>(&self, path: &str) -> Result<R, Error>
    where
        R: for<'de> serde::Deserialize<'de>,
    {
        let resp = self
            .authed(self.client.get(self.url(path)))
            .send()
            .await
            .with_context(|| format!("fetching {path}"))?;
        Ok(check_status(resp)
            .await?
            .json()
            .await
            .with_context(|| format!("parsing answer to {path}"))?)
    }
}

/// Turns non-success answers into the error the server described
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp
        .bytes()
        .await
        .with_context(|| format!("reading body of {status} answer"))?;
    match api::Error::parse(&body) {
        Ok(e) => Err(Error::Api(e)),
        Err(e) => Err(Error::Transport(
            e.context(format!("server answered {status} with unparseable body")),
        )),
    }
}

#[async_trait]
impl Api for HttpApi {
    async fn fetch_amas(&self) -> Result<Vec<Article>, Error> {
        self.get("amas").await
    }

    async fn fetch_feed(&self) -> Result<Vec<Article>, Error> {
        self.get("feed").await
    }

    async fn fetch_thread(&self, slug: &str) -> Result<Thread, Error> {
        self.get(&format!("ama/{slug}")).await
    }

    async fn submit_action(&self, a: Action) -> Result<(), Error> {
        if self.login.is_none() {
            return Err(Error::Api(api::Error::Unauthenticated));
        }
        let name = a.name();
        let resp = self
            .authed(self.client.post(self.url("submit-action")))
            .json(&a)
            .send()
            .await
            .with_context(|| format!("submitting {name} action"))?;
        check_status(resp).await?;
        Ok(())
    }
}
