//! Mastodon REST client.
//!
//! Blocking `reqwest`: the poll loop is single-threaded and a fetch holds
//! it up until the response or the timeout. Every API call carries the stored
//! bearer token; responses are decoded with `serde_json` into private wire
//! types and converted into [`crate::model`] values at the boundary.
//!
//! Credentials live in two small line-oriented files:
//!
//! | File          | Lines                                   |
//! |---------------|-----------------------------------------|
//! | client creds  | `client_id`, `client_secret`, base URL  |
//! | user creds    | `access_token`, base URL                |

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use crate::model::{Account, FeedItem, NotificationItem, NotificationKind};
use crate::service::{FeedService, ServiceError};

const HOME_TIMELINE: &str = "/api/v1/timelines/home?limit=1";
const NOTIFICATIONS: &str = "/api/v1/notifications?limit=1";
const STATUSES: &str = "/api/v1/statuses";
const APPS: &str = "/api/v1/apps";
const TOKEN: &str = "/oauth/token";

const OOB_REDIRECT: &str = "urn:ietf:wg:oauth:2.0:oob";
const SCOPES: &str = "read write";
const TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// An application identity issued by `register_app`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
}

/// A logged-in user's access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub access_token: String,
    pub base_url: String,
}

impl ClientCredentials {
    pub fn load(path: &Path) -> Result<Self, ServiceError> {
        let [client_id, client_secret, base_url] = read_lines(path)?;
        Ok(Self {
            client_id,
            client_secret,
            base_url,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ServiceError> {
        write_lines(path, &[&self.client_id, &self.client_secret, &self.base_url])
    }
}

impl UserCredentials {
    pub fn load(path: &Path) -> Result<Self, ServiceError> {
        let [access_token, base_url] = read_lines(path)?;
        Ok(Self {
            access_token,
            base_url,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ServiceError> {
        write_lines(path, &[&self.access_token, &self.base_url])
    }
}

fn read_lines<const N: usize>(path: &Path) -> Result<[String; N], ServiceError> {
    let text = fs::read_to_string(path).map_err(|source| ServiceError::Io {
        path: path.to_owned(),
        source,
    })?;
    parse_lines(&text).ok_or_else(|| ServiceError::Credentials {
        path: path.to_owned(),
        reason: format!("expected {N} non-empty lines"),
    })
}

/// The first `N` lines, trimmed. Extra lines are ignored.
fn parse_lines<const N: usize>(text: &str) -> Option<[String; N]> {
    let mut lines = text.lines().map(str::trim);
    let mut out: [String; N] = std::array::from_fn(|_| String::new());
    for slot in &mut out {
        let line = lines.next().filter(|l| !l.is_empty())?;
        line.clone_into(slot);
    }
    Some(out)
}

fn write_lines(path: &Path, lines: &[&str]) -> Result<(), ServiceError> {
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(path, text).map_err(|source| ServiceError::Io {
        path: path.to_owned(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// An authenticated connection to one Mastodon instance.
#[derive(Debug, Clone)]
pub struct MastodonClient {
    http: Client,
    base_url: String,
    token: String,
}

impl MastodonClient {
    pub fn new(credentials: UserCredentials) -> Result<Self, ServiceError> {
        let base_url = credentials.base_url.trim_end_matches('/').to_owned();
        Ok(Self {
            http: http_client(&base_url)?,
            base_url,
            token: credentials.access_token,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ServiceError> {
        let request = self
            .http
            .get(format!("{}{endpoint}", self.base_url))
            .bearer_auth(&self.token);
        send(request, endpoint)
    }
}

impl FeedService for MastodonClient {
    fn timeline_head(&self) -> Result<Option<FeedItem>, ServiceError> {
        let page: Vec<WireStatus> = self.get(HOME_TIMELINE)?;
        Ok(page.into_iter().next().map(FeedItem::from))
    }

    fn notifications_head(&self) -> Result<Option<NotificationItem>, ServiceError> {
        let page: Vec<WireNotification> = self.get(NOTIFICATIONS)?;
        Ok(page.into_iter().next().map(NotificationItem::from))
    }

    fn submit_post(&self, text: &str) -> Result<(), ServiceError> {
        let request = self
            .http
            .post(format!("{}{STATUSES}", self.base_url))
            .bearer_auth(&self.token)
            .json(&json!({ "status": text }));
        let posted: WireStatus = send(request, STATUSES)?;
        info!(id = %posted.id, "posted status");
        Ok(())
    }
}

/// Register this kiosk as an application on `base_url` and store the
/// issued client credentials at `to_file`.
pub fn register_app(
    base_url: &str,
    app_name: &str,
    to_file: &Path,
) -> Result<ClientCredentials, ServiceError> {
    let base_url = base_url.trim_end_matches('/');
    let request = http_client(base_url)?
        .post(format!("{base_url}{APPS}"))
        .json(&json!({
            "client_name": app_name,
            "redirect_uris": OOB_REDIRECT,
            "scopes": SCOPES,
        }));
    let app: WireApp = send(request, APPS)?;

    let credentials = ClientCredentials {
        client_id: app.client_id,
        client_secret: app.client_secret,
        base_url: base_url.to_owned(),
    };
    credentials.save(to_file)?;
    info!(base_url, path = %to_file.display(), "registered application");
    Ok(credentials)
}

/// Exchange a username and password for an access token and store it at
/// `to_file`.
pub fn log_in(
    client: &ClientCredentials,
    username: &str,
    password: &str,
    to_file: &Path,
) -> Result<UserCredentials, ServiceError> {
    let base_url = client.base_url.trim_end_matches('/');
    let request = http_client(base_url)?
        .post(format!("{base_url}{TOKEN}"))
        .json(&json!({
            "grant_type": "password",
            "client_id": client.client_id,
            "client_secret": client.client_secret,
            "username": username,
            "password": password,
            "scope": SCOPES,
        }));
    let token: WireToken = send(request, TOKEN)?;

    let credentials = UserCredentials {
        access_token: token.access_token,
        base_url: base_url.to_owned(),
    };
    credentials.save(to_file)?;
    info!(username, path = %to_file.display(), "logged in");
    Ok(credentials)
}

fn http_client(base_url: &str) -> Result<Client, ServiceError> {
    Client::builder()
        .timeout(TIMEOUT)
        .user_agent(concat!("toot-kiosk/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| ServiceError::Transport {
            endpoint: base_url.to_owned(),
            source,
        })
}

fn send<T: DeserializeOwned>(request: RequestBuilder, endpoint: &str) -> Result<T, ServiceError> {
    let transport = |source| ServiceError::Transport {
        endpoint: endpoint.to_owned(),
        source,
    };
    let response = request.send().map_err(transport)?;
    let status = response.status();
    let body = response.text().map_err(transport)?;
    debug!(endpoint, status = status.as_u16(), bytes = body.len(), "response");

    if !status.is_success() {
        return Err(ServiceError::Status {
            endpoint: endpoint.to_owned(),
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|source| ServiceError::Decode {
        endpoint: endpoint.to_owned(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WireAccount {
    acct: String,
    #[serde(default)]
    display_name: String,
    avatar_static: String,
}

#[derive(Debug, Deserialize)]
struct WireStatus {
    id: String,
    created_at: String,
    #[serde(default)]
    content: String,
    account: WireAccount,
    #[serde(default)]
    reblog: Option<Box<WireStatus>>,
}

#[derive(Debug, Deserialize)]
struct WireNotification {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    created_at: String,
    account: WireAccount,
    #[serde(default)]
    status: Option<WireStatus>,
}

#[derive(Debug, Deserialize)]
struct WireApp {
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct WireToken {
    access_token: String,
}

impl From<WireAccount> for Account {
    fn from(wire: WireAccount) -> Self {
        Self {
            handle: wire.acct,
            display_name: wire.display_name,
            avatar_url: wire.avatar_static,
        }
    }
}

impl From<WireStatus> for FeedItem {
    fn from(wire: WireStatus) -> Self {
        Self {
            id: wire.id.into(),
            author: wire.account.into(),
            created_at: wire.created_at,
            body_markup: wire.content,
            reblog: wire.reblog.map(|original| Box::new(Self::from(*original))),
        }
    }
}

impl From<WireNotification> for NotificationItem {
    fn from(wire: WireNotification) -> Self {
        Self {
            id: wire.id.into(),
            kind: NotificationKind::parse(&wire.kind),
            actor: wire.account.into(),
            created_at: wire.created_at,
            status: wire.status.map(FeedItem::from),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
