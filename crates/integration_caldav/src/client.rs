//! CalDAV client
//!
//! Connects to CalDAV servers (Yandex Calendar by default) for calendar and
//! event operations. Supports principal discovery via PROPFIND, calendar
//! queries via REPORT and ETag-guarded PUT/DELETE.

use async_trait::async_trait;
use chrono::Utc;
use domain::{AuthMethod, CalendarRef, Credentials, DateRange, Event, EventUpdate, NewEvent};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url, header};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::ical::{self, PropertyPatch};
use crate::xml::{DavResponse, parse_multistatus};

/// Default server
pub const YANDEX_CALDAV_URL: &str = "https://caldav.yandex.ru/";

/// CalDAV client errors
#[derive(Debug, Error)]
pub enum CalDavError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Todo not found: {0}")]
    TodoNotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Request timed out")]
    Timeout,
}

/// CalDAV server configuration
///
/// Credentials are passed separately so that this struct can be loaded from
/// configuration files as is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalDavConfig {
    /// Server URL (e.g., https://caldav.yandex.ru/)
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Calendar home collection; discovered when not set
    #[serde(default)]
    pub calendar_home: Option<String>,
    /// Verify TLS certificates (default: true)
    #[serde(default = "default_true")]
    pub verify_certs: bool,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for CalDavConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            calendar_home: None,
            verify_certs: true,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_server_url() -> String {
    YANDEX_CALDAV_URL.to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_timeout() -> u64 {
    30
}

/// A resource together with the data needed to write it back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredItem<T> {
    pub item: T,
    /// Absolute resource URL
    pub href: String,
    pub etag: Option<String>,
    /// The iCalendar object as returned by the server
    pub raw: String,
}

/// CalDAV client trait for calendar and event operations
#[async_trait]
pub trait CalDavClient: Send + Sync {
    /// Locate the collection holding the account's calendars
    async fn calendar_home(&self) -> Result<String, CalDavError>;

    /// List calendars in the calendar home
    async fn list_calendars(&self) -> Result<Vec<CalendarRef>, CalDavError>;

    /// Get events, restricted to those overlapping `range` when given
    async fn get_events(
        &self,
        calendar: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<Event>, CalDavError>;

    /// Look up one event by UID
    async fn find_event(&self, calendar: &str, uid: &str)
    -> Result<StoredItem<Event>, CalDavError>;

    /// Create a new event with a fresh UID
    async fn create_event(&self, calendar: &str, event: &NewEvent) -> Result<Event, CalDavError>;

    /// Change the supplied fields of an event
    async fn update_event(
        &self,
        calendar: &str,
        uid: &str,
        update: &EventUpdate,
    ) -> Result<Event, CalDavError>;

    /// Delete an event
    async fn delete_event(&self, calendar: &str, uid: &str) -> Result<(), CalDavError>;
}

/// Write precondition for PUT/DELETE
#[derive(Debug, Clone, Copy)]
pub(crate) enum Precondition<'a> {
    /// `If-None-Match: *`
    Absent,
    /// `If-Match: <etag>`, or unconditional when the server sent no ETag
    Matches(Option<&'a str>),
}

/// HTTP-based CalDAV client implementation
#[derive(Debug)]
pub struct HttpCalDavClient {
    client: Client,
    config: CalDavConfig,
    credentials: Credentials,
    base_url: Url,
}

impl HttpCalDavClient {
    /// Create a new CalDAV client
    pub fn new(config: CalDavConfig, credentials: Credentials) -> Result<Self, CalDavError> {
        let base_url = Url::parse(&config.server_url).map_err(|e| {
            CalDavError::InvalidData(format!("invalid server URL '{}': {e}", config.server_url))
        })?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_certs)
            .build()
            .map_err(|e| CalDavError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config,
            credentials,
            base_url,
        })
    }

    /// Build a request with proper authentication
    pub(crate) fn build_request(&self, method: &str, url: &str) -> RequestBuilder {
        let method = Method::from_bytes(method.as_bytes()).unwrap_or(Method::GET);
        let request = self.client.request(method, url);

        match self.credentials.auth() {
            AuthMethod::Basic { username, password } => {
                request.basic_auth(username, Some(password.expose_secret()))
            },
            AuthMethod::OAuth { token } => request.header(
                header::AUTHORIZATION,
                format!("OAuth {}", token.expose_secret()),
            ),
        }
    }

    /// Resolve an href from the server against the configured base URL
    pub(crate) fn resolve_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        self.base_url
            .join(href)
            .map_or_else(|_| href.to_string(), String::from)
    }

    /// Build the calendar collection URL (always with a trailing slash)
    pub(crate) fn calendar_url(&self, calendar: &str) -> String {
        let url = self.resolve_url(calendar);
        if url.ends_with('/') {
            url
        } else {
            format!("{url}/")
        }
    }

    /// Build the URL for a new resource in a calendar
    pub(crate) fn resource_url(&self, calendar: &str, uid: &str) -> String {
        let clean_uid = uid.trim_end_matches(".ics");
        format!("{}{clean_uid}.ics", self.calendar_url(calendar))
    }

    /// Send a request, mapping transport errors
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, CalDavError> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                return CalDavError::Timeout;
            }
            CalDavError::ConnectionFailed(e.to_string())
        })
    }

    /// PROPFIND returning the parsed multistatus
    async fn propfind(
        &self,
        url: &str,
        depth: &str,
        body: &'static str,
    ) -> Result<Vec<DavResponse>, CalDavError> {
        let response = self
            .send(
                self.build_request("PROPFIND", url)
                    .header("Depth", depth)
                    .header(header::CONTENT_TYPE, "application/xml; charset=utf-8")
                    .body(body),
            )
            .await?;

        check_status(response.status(), false, || {
            CalDavError::CalendarNotFound(url.to_string())
        })?;

        let body = response
            .text()
            .await
            .map_err(|e| CalDavError::RequestFailed(e.to_string()))?;

        debug!(url = %url, response_len = body.len(), "PROPFIND response received");
        parse_multistatus(&body)
    }

    /// Run a calendar-query REPORT and return the raw responses
    pub(crate) async fn calendar_query(
        &self,
        calendar: &str,
        body: String,
    ) -> Result<Vec<DavResponse>, CalDavError> {
        let url = self.calendar_url(calendar);

        let response = self
            .send(
                self.build_request("REPORT", &url)
                    .header("Depth", "1")
                    .header(header::CONTENT_TYPE, "application/xml; charset=utf-8")
                    .body(body),
            )
            .await?;

        check_status(response.status(), false, || {
            CalDavError::CalendarNotFound(calendar.to_string())
        })?;

        let body = response
            .text()
            .await
            .map_err(|e| CalDavError::RequestFailed(e.to_string()))?;

        debug!(
            calendar = %calendar,
            response_len = body.len(),
            "REPORT response received"
        );
        parse_multistatus(&body)
    }

    /// PUT an iCalendar object, returning the new ETag if the server sent one
    pub(crate) async fn put_resource(
        &self,
        url: &str,
        ical: String,
        precondition: Precondition<'_>,
        not_found: impl FnOnce() -> CalDavError + Send,
    ) -> Result<Option<String>, CalDavError> {
        let mut request = self
            .build_request("PUT", url)
            .header(header::CONTENT_TYPE, "text/calendar; charset=utf-8")
            .body(ical);
        request = match precondition {
            Precondition::Absent => request.header(header::IF_NONE_MATCH, "*"),
            Precondition::Matches(Some(etag)) => request.header(header::IF_MATCH, etag),
            Precondition::Matches(None) => request,
        };

        let response = self.send(request).await?;
        check_status(response.status(), true, not_found)?;

        Ok(response
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string))
    }

    /// DELETE a resource
    pub(crate) async fn delete_resource(
        &self,
        url: &str,
        etag: Option<&str>,
        not_found: impl FnOnce() -> CalDavError + Send,
    ) -> Result<(), CalDavError> {
        let mut request = self.build_request("DELETE", url);
        if let Some(etag) = etag {
            request = request.header(header::IF_MATCH, etag);
        }

        let response = self.send(request).await?;
        check_status(response.status(), true, not_found)
    }

    /// Fallback calendar home when discovery yields nothing
    fn default_calendar_home(&self) -> Result<String, CalDavError> {
        let account = self.credentials.account_name().ok_or_else(|| {
            CalDavError::UnknownAccount(
                "cannot locate the calendar home: server did not report one and no \
                 user id or username is known (pass --user-id)"
                    .to_string(),
            )
        })?;
        Ok(self.calendar_url(&format!("/calendars/{account}/")))
    }

    /// Collect the resources of a query whose calendar-data parses
    pub(crate) fn collect_items<T>(
        &self,
        responses: Vec<DavResponse>,
        parse: impl Fn(&str) -> Result<Vec<T>, CalDavError>,
    ) -> Vec<StoredItem<T>> {
        let mut items = Vec::new();
        for response in responses {
            let Some(raw) = response.calendar_data else {
                continue;
            };
            match parse(&raw) {
                Ok(parsed) => {
                    let href = self.resolve_url(&response.href);
                    items.extend(parsed.into_iter().map(|item| StoredItem {
                        item,
                        href: href.clone(),
                        etag: response.etag.clone(),
                        raw: raw.clone(),
                    }));
                },
                Err(e) => warn!(href = %response.href, error = %e, "Skipping unparsable resource"),
            }
        }
        items
    }
}

/// Map an HTTP status to a client error
///
/// `write` distinguishes PUT/DELETE, where 403 means the server refused the
/// change rather than the credentials.
pub(crate) fn check_status(
    status: StatusCode,
    write: bool,
    not_found: impl FnOnce() -> CalDavError,
) -> Result<(), CalDavError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED => Err(CalDavError::AuthenticationFailed),
        StatusCode::NOT_FOUND | StatusCode::GONE => Err(not_found()),
        StatusCode::PRECONDITION_FAILED => Err(CalDavError::Conflict(
            "resource changed on the server or already exists (HTTP 412)".to_string(),
        )),
        StatusCode::CONFLICT => Err(CalDavError::Conflict(
            "server rejected the change (HTTP 409)".to_string(),
        )),
        StatusCode::FORBIDDEN if write => Err(CalDavError::Conflict(
            "server refused the write (HTTP 403)".to_string(),
        )),
        StatusCode::FORBIDDEN => Err(CalDavError::AuthenticationFailed),
        status if status.is_server_error() => Err(CalDavError::RequestFailed(format!(
            "Server error: {status}"
        ))),
        status => Err(CalDavError::RequestFailed(format!("HTTP {status}"))),
    }
}

/// calendar-query body for one component type
///
/// `range` adds a time-range filter, `uid` a UID text-match.
pub(crate) fn calendar_query_body(
    component: &str,
    range: Option<DateRange>,
    uid: Option<&str>,
) -> String {
    let mut filter = String::new();
    if let Some(range) = range {
        filter.push_str(&format!(
            r#"
        <C:time-range start="{}" end="{}"/>"#,
            ical::format_utc(range.start()),
            ical::format_utc(range.end())
        ));
    }
    if let Some(uid) = uid {
        filter.push_str(&format!(
            r#"
        <C:prop-filter name="UID">
          <C:text-match collation="i;octet">{}</C:text-match>
        </C:prop-filter>"#,
            quick_xml::escape::escape(uid)
        ));
    }

    let inner = if filter.is_empty() {
        format!(r#"<C:comp-filter name="{component}"/>"#)
    } else {
        format!(
            r#"<C:comp-filter name="{component}">{filter}
      </C:comp-filter>"#
        )
    };

    format!(
        r#"<?xml version="1.0" encoding="utf-8" ?>
<C:calendar-query xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:prop>
    <D:getetag/>
    <C:calendar-data/>
  </D:prop>
  <C:filter>
    <C:comp-filter name="VCALENDAR">
      {inner}
    </C:comp-filter>
  </C:filter>
</C:calendar-query>"#
    )
}

const PRINCIPAL_PROPFIND: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:">
  <D:prop>
    <D:current-user-principal/>
  </D:prop>
</D:propfind>"#;

const HOME_PROPFIND: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:prop>
    <C:calendar-home-set/>
  </D:prop>
</D:propfind>"#;

const CALENDARS_PROPFIND: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:prop>
    <D:resourcetype/>
    <D:displayname/>
    <C:supported-calendar-component-set/>
  </D:prop>
</D:propfind>"#;

fn calendar_from_response(response: &DavResponse, href: String) -> CalendarRef {
    let name = response
        .display_name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| {
            href.trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string()
        });

    let mut calendar = CalendarRef {
        name,
        href,
        supports_events: response.components.iter().any(|c| c == "VEVENT"),
        supports_todos: response.components.iter().any(|c| c == "VTODO"),
    };
    if response.components.is_empty() {
        let todo_list = calendar.is_todo_list();
        calendar.supports_events = !todo_list;
        calendar.supports_todos = todo_list;
    }
    calendar
}

#[async_trait]
impl CalDavClient for HttpCalDavClient {
    #[instrument(skip(self))]
    async fn calendar_home(&self) -> Result<String, CalDavError> {
        if let Some(home) = &self.config.calendar_home {
            return Ok(self.calendar_url(home));
        }

        let root = self.base_url.to_string();
        let principal = self
            .propfind(&root, "0", PRINCIPAL_PROPFIND)
            .await?
            .into_iter()
            .find_map(|r| r.principal_href);

        let Some(principal) = principal else {
            debug!("Server did not report current-user-principal");
            return self.default_calendar_home();
        };

        let principal_url = self.resolve_url(&principal);
        let home = self
            .propfind(&principal_url, "0", HOME_PROPFIND)
            .await?
            .into_iter()
            .find_map(|r| r.calendar_home_href);

        match home {
            Some(home) => {
                debug!(principal = %principal, home = %home, "Discovered calendar home");
                Ok(self.calendar_url(&home))
            },
            None => self.default_calendar_home(),
        }
    }

    #[instrument(skip(self))]
    async fn list_calendars(&self) -> Result<Vec<CalendarRef>, CalDavError> {
        let home = self.calendar_home().await?;
        let responses = self.propfind(&home, "1", CALENDARS_PROPFIND).await?;

        let calendars: Vec<CalendarRef> = responses
            .iter()
            .filter(|r| r.is_calendar)
            .map(|r| calendar_from_response(r, self.calendar_url(&r.href)))
            .collect();

        debug!(count = calendars.len(), "Listed calendars");
        Ok(calendars)
    }

    #[instrument(skip(self))]
    async fn get_events(
        &self,
        calendar: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<Event>, CalDavError> {
        let responses = self
            .calendar_query(calendar, calendar_query_body("VEVENT", range, None))
            .await?;

        Ok(self
            .collect_items(responses, ical::parse_events)
            .into_iter()
            .map(|stored| stored.item)
            .collect())
    }

    #[instrument(skip(self))]
    async fn find_event(
        &self,
        calendar: &str,
        uid: &str,
    ) -> Result<StoredItem<Event>, CalDavError> {
        let responses = self
            .calendar_query(calendar, calendar_query_body("VEVENT", None, Some(uid)))
            .await?;

        self.collect_items(responses, ical::parse_events)
            .into_iter()
            .find(|stored| stored.item.uid == uid)
            .ok_or_else(|| CalDavError::EventNotFound(uid.to_string()))
    }

    #[instrument(skip(self, event), fields(title = %event.title))]
    async fn create_event(&self, calendar: &str, event: &NewEvent) -> Result<Event, CalDavError> {
        let uid = Uuid::new_v4().to_string();
        let now = Utc::now();
        let url = self.resource_url(calendar, &uid);
        let body = ical::build_vevent(&uid, event, now);

        self.put_resource(&url, body, Precondition::Absent, || {
            CalDavError::CalendarNotFound(calendar.to_string())
        })
        .await?;

        debug!(uid = %uid, "Event created successfully");
        Ok(Event {
            uid,
            title: event.title.clone(),
            start: event.start,
            end: Some(event.end),
            all_day: false,
            description: event.description.clone(),
            location: event.location.clone(),
            rrule: event.rrule.clone(),
            reminder_minutes: event.reminder_minutes,
            created: Some(now),
            last_modified: Some(now),
        })
    }

    #[instrument(skip(self, update))]
    async fn update_event(
        &self,
        calendar: &str,
        uid: &str,
        update: &EventUpdate,
    ) -> Result<Event, CalDavError> {
        let stored = self.find_event(calendar, uid).await?;
        let mut merged = update
            .apply_to(&stored.item)
            .map_err(|e| CalDavError::InvalidData(e.to_string()))?;

        let now = Utc::now();
        let mut patches = Vec::new();
        if let Some(title) = &update.title {
            patches.push(PropertyPatch::set("SUMMARY", ical::escape_text(title)));
        }
        if let Some(description) = &update.description {
            patches.push(PropertyPatch::set(
                "DESCRIPTION",
                ical::escape_text(description),
            ));
        }
        if let Some(location) = &update.location {
            patches.push(PropertyPatch::set("LOCATION", ical::escape_text(location)));
        }
        if update.start.is_some() || update.end.is_some() {
            // DTSTART and DTEND must share a value type, so both are rewritten
            patches.push(PropertyPatch::set("DTSTART", ical::format_utc(merged.start)));
            if let Some(end) = merged.end {
                patches.push(PropertyPatch::set("DTEND", ical::format_utc(end)));
                patches.push(PropertyPatch::remove("DURATION"));
            }
        }
        let sequence = ical::sequence_of(&stored.raw, "VEVENT") + 1;
        patches.push(PropertyPatch::set("DTSTAMP", ical::format_utc(now)));
        patches.push(PropertyPatch::set("LAST-MODIFIED", ical::format_utc(now)));
        patches.push(PropertyPatch::set("SEQUENCE", sequence.to_string()));

        let body = ical::patch_component(&stored.raw, "VEVENT", &patches)?;
        self.put_resource(
            &stored.href,
            body,
            Precondition::Matches(stored.etag.as_deref()),
            || CalDavError::EventNotFound(uid.to_string()),
        )
        .await?;

        merged.last_modified = Some(now);
        debug!(uid = %uid, sequence, "Event updated successfully");
        Ok(merged)
    }

    #[instrument(skip(self))]
    async fn delete_event(&self, calendar: &str, uid: &str) -> Result<(), CalDavError> {
        let stored = self.find_event(calendar, uid).await?;
        self.delete_resource(&stored.href, stored.etag.as_deref(), || {
            CalDavError::EventNotFound(uid.to_string())
        })
        .await?;

        debug!(uid = %uid, "Event deleted successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic() -> Credentials {
        Credentials::resolve(
            Some("user@yandex.ru".to_string()),
            Some("app-pass".to_string()),
            None,
            None,
        )
        .expect("credentials")
    }

    fn client(server_url: &str) -> HttpCalDavClient {
        let config = CalDavConfig {
            server_url: server_url.to_string(),
            ..CalDavConfig::default()
        };
        HttpCalDavClient::new(config, basic()).expect("client")
    }

    // === Config Tests ===

    #[test]
    fn config_defaults_to_yandex() {
        let config = CalDavConfig::default();
        assert_eq!(config.server_url, "https://caldav.yandex.ru/");
        assert!(config.verify_certs);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.calendar_home.is_none());
    }

    #[test]
    fn config_deserialization_defaults() {
        let config: CalDavConfig = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(config.server_url, YANDEX_CALDAV_URL);
        assert!(config.verify_certs);
    }

    #[test]
    fn invalid_server_url_is_rejected() {
        let config = CalDavConfig {
            server_url: "not a url".to_string(),
            ..CalDavConfig::default()
        };
        assert!(matches!(
            HttpCalDavClient::new(config, basic()),
            Err(CalDavError::InvalidData(_))
        ));
    }

    #[test]
    fn client_debug_redacts_password() {
        let debug = format!("{:?}", client("https://caldav.yandex.ru/"));
        assert!(!debug.contains("app-pass"));
    }

    // === Error Tests ===

    #[test]
    fn error_display() {
        assert_eq!(
            CalDavError::AuthenticationFailed.to_string(),
            "Authentication failed"
        );
        assert_eq!(
            CalDavError::EventNotFound("e1".to_string()).to_string(),
            "Event not found: e1"
        );
        assert_eq!(CalDavError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            CalDavError::Conflict("HTTP 412".to_string()).to_string(),
            "Conflict: HTTP 412"
        );
    }

    #[test]
    fn status_mapping() {
        let nf = || CalDavError::EventNotFound("x".to_string());
        assert!(check_status(StatusCode::MULTI_STATUS, false, nf).is_ok());
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED, false, nf),
            Err(CalDavError::AuthenticationFailed)
        ));
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, true, nf),
            Err(CalDavError::EventNotFound(_))
        ));
        assert!(matches!(
            check_status(StatusCode::PRECONDITION_FAILED, true, nf),
            Err(CalDavError::Conflict(_))
        ));
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN, true, nf),
            Err(CalDavError::Conflict(_))
        ));
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN, false, nf),
            Err(CalDavError::AuthenticationFailed)
        ));
        assert!(matches!(
            check_status(StatusCode::BAD_GATEWAY, false, nf),
            Err(CalDavError::RequestFailed(_))
        ));
    }

    // === URL Building Tests ===

    #[test]
    fn resolve_url_joins_absolute_paths() {
        let client = client("https://caldav.yandex.ru/");
        assert_eq!(
            client.resolve_url("/calendars/user%40yandex.ru/events-1/"),
            "https://caldav.yandex.ru/calendars/user%40yandex.ru/events-1/"
        );
        assert_eq!(
            client.resolve_url("https://other.example/cal/"),
            "https://other.example/cal/"
        );
    }

    #[test]
    fn calendar_url_adds_trailing_slash() {
        let client = client("https://dav.example.com/dav.php/");
        assert_eq!(
            client.calendar_url("/calendars/alice/work"),
            "https://dav.example.com/calendars/alice/work/"
        );
    }

    #[test]
    fn resource_url_strips_existing_extension() {
        let client = client("https://caldav.yandex.ru/");
        assert_eq!(
            client.resource_url("/calendars/u/events-1/", "abc.ics"),
            "https://caldav.yandex.ru/calendars/u/events-1/abc.ics"
        );
    }

    #[test]
    fn default_home_uses_user_id_before_username() {
        let creds = Credentials::resolve(
            Some("user@yandex.ru".to_string()),
            Some("pw".to_string()),
            None,
            Some("1130000012345".to_string()),
        )
        .expect("credentials");
        let client =
            HttpCalDavClient::new(CalDavConfig::default(), creds).expect("client");
        assert_eq!(
            client.default_calendar_home().expect("home"),
            "https://caldav.yandex.ru/calendars/1130000012345/"
        );
    }

    #[test]
    fn default_home_needs_an_account_name() {
        let creds =
            Credentials::resolve(None, None, Some("token".to_string()), None).expect("creds");
        let client =
            HttpCalDavClient::new(CalDavConfig::default(), creds).expect("client");
        assert!(matches!(
            client.default_calendar_home(),
            Err(CalDavError::InvalidData(_))
        ));
    }

    // === Query Body Tests ===

    #[test]
    fn query_body_with_range() {
        let range = DateRange::new(
            chrono::TimeZone::with_ymd_and_hms(&Utc, 2026, 3, 1, 0, 0, 0)
                .single()
                .expect("valid"),
            chrono::TimeZone::with_ymd_and_hms(&Utc, 2026, 3, 8, 0, 0, 0)
                .single()
                .expect("valid"),
        )
        .expect("range");
        let body = calendar_query_body("VEVENT", Some(range), None);
        assert!(body.contains(r#"<C:comp-filter name="VEVENT">"#));
        assert!(body.contains(r#"<C:time-range start="20260301T000000Z" end="20260308T000000Z"/>"#));
        assert!(!body.contains("prop-filter"));
    }

    #[test]
    fn query_body_escapes_uid() {
        let body = calendar_query_body("VTODO", None, Some("a<b&c"));
        assert!(body.contains("a&lt;b&amp;c"));
        assert!(body.contains(r#"<C:comp-filter name="VTODO">"#));
    }

    #[test]
    fn query_body_without_filters() {
        let body = calendar_query_body("VEVENT", None, None);
        assert!(body.contains(r#"<C:comp-filter name="VEVENT"/>"#));
    }

    // === Calendar mapping ===

    #[test]
    fn calendar_capabilities_from_component_set() {
        let response = DavResponse {
            display_name: Some("Не забыть".to_string()),
            is_calendar: true,
            components: vec!["VTODO".to_string()],
            ..DavResponse::default()
        };
        let calendar = calendar_from_response(&response, "https://h/c/todos-1/".to_string());
        assert!(calendar.supports_todos);
        assert!(!calendar.supports_events);
        assert_eq!(calendar.name, "Не забыть");
    }

    #[test]
    fn calendar_capabilities_fall_back_to_href() {
        let response = DavResponse {
            is_calendar: true,
            ..DavResponse::default()
        };
        let events = calendar_from_response(&response, "https://h/c/events-1/".to_string());
        assert!(events.supports_events);
        assert!(!events.supports_todos);
        assert_eq!(events.name, "events-1");

        let todos = calendar_from_response(&response, "https://h/c/todos-1/".to_string());
        assert!(todos.supports_todos);
        assert!(!todos.supports_events);
    }
}
