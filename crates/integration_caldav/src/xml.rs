//! WebDAV multistatus parsing
//!
//! Servers disagree on namespace prefixes (`D:`, `d:`, `cal:`, none), so
//! elements are matched by local name and their position under the parent.

use quick_xml::{Reader, events::BytesStart, events::Event};
use tracing::debug;

use crate::client::CalDavError;

/// One `<response>` element of a multistatus body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DavResponse {
    /// Resource href as sent by the server (usually an absolute path)
    pub href: String,
    pub etag: Option<String>,
    pub display_name: Option<String>,
    /// `<resourcetype>` contains `<calendar/>`
    pub is_calendar: bool,
    /// Component names from `supported-calendar-component-set`
    pub components: Vec<String>,
    pub calendar_data: Option<String>,
    pub principal_href: Option<String>,
    pub calendar_home_href: Option<String>,
}

/// Parse a `207 Multi-Status` body
pub fn parse_multistatus(xml_body: &str) -> Result<Vec<DavResponse>, CalDavError> {
    let mut reader = Reader::from_str(xml_body);
    reader.config_mut().trim_text(true);

    let mut responses = Vec::new();
    let mut current: Option<DavResponse> = None;
    let mut stack: Vec<String> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(&e);
                if name == "response" {
                    current = Some(DavResponse::default());
                }
                if let Some(response) = current.as_mut() {
                    mark_element(response, &name, stack.last().map(String::as_str), &e);
                }
                stack.push(name);
            },
            Ok(Event::Empty(e)) => {
                let name = local_name(&e);
                if let Some(response) = current.as_mut() {
                    mark_element(response, &name, stack.last().map(String::as_str), &e);
                }
            },
            Ok(Event::Text(e)) => {
                if let Some(response) = current.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| CalDavError::ParseError(format!("XML text: {err}")))?;
                    push_text(response, &stack, &text);
                }
            },
            Ok(Event::CData(e)) => {
                if let Some(response) = current.as_mut() {
                    let text = std::str::from_utf8(e.as_ref())
                        .map_err(|err| CalDavError::ParseError(format!("CDATA: {err}")))?;
                    push_text(response, &stack, text);
                }
            },
            Ok(Event::End(_)) => {
                if stack.pop().as_deref() == Some("response") {
                    if let Some(response) = current.take() {
                        responses.push(response);
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!(error = ?e, "XML parsing error in multistatus response");
                return Err(CalDavError::ParseError(format!(
                    "malformed multistatus at byte {}: {e}",
                    reader.buffer_position()
                )));
            },
            _ => {},
        }
        buf.clear();
    }

    Ok(responses)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase()
}

fn mark_element(response: &mut DavResponse, name: &str, parent: Option<&str>, e: &BytesStart<'_>) {
    match (name, parent) {
        ("calendar", Some("resourcetype")) => response.is_calendar = true,
        ("comp", Some("supported-calendar-component-set")) => {
            if let Ok(Some(attr)) = e.try_get_attribute("name") {
                if let Ok(value) = attr.unescape_value() {
                    response.components.push(value.to_ascii_uppercase());
                }
            }
        },
        _ => {},
    }
}

fn push_text(response: &mut DavResponse, stack: &[String], text: &str) {
    let Some(top) = stack.last() else {
        return;
    };
    let parent = stack.len().checked_sub(2).and_then(|i| stack.get(i));

    match (top.as_str(), parent.map(String::as_str)) {
        ("href", Some("response")) => response.href.push_str(text.trim()),
        ("href", Some("current-user-principal")) => {
            response.principal_href = Some(text.trim().to_string());
        },
        ("href", Some("calendar-home-set")) => {
            response.calendar_home_href = Some(text.trim().to_string());
        },
        ("getetag", _) => response.etag = Some(text.trim().to_string()),
        ("displayname", _) => response.display_name = Some(text.trim().to_string()),
        ("calendar-data", _) => response
            .calendar_data
            .get_or_insert_with(String::new)
            .push_str(text),
        _ => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_calendar_collections_with_any_prefix() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:" xmlns:cal="urn:ietf:params:xml:ns:caldav">
  <d:response>
    <d:href>/calendars/user%40yandex.ru/</d:href>
    <d:propstat><d:prop><d:resourcetype><d:collection/></d:resourcetype></d:prop></d:propstat>
  </d:response>
  <d:response>
    <d:href>/calendars/user%40yandex.ru/events-1/</d:href>
    <d:propstat>
      <d:prop>
        <d:displayname>Мои события</d:displayname>
        <d:resourcetype><d:collection/><cal:calendar/></d:resourcetype>
        <cal:supported-calendar-component-set>
          <cal:comp name="VEVENT"/>
        </cal:supported-calendar-component-set>
      </d:prop>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

        let responses = parse_multistatus(xml).expect("parse");
        assert_eq!(responses.len(), 2);
        assert!(!responses[0].is_calendar);
        assert!(responses[1].is_calendar);
        assert_eq!(responses[1].display_name.as_deref(), Some("Мои события"));
        assert_eq!(responses[1].components, vec!["VEVENT"]);
        assert_eq!(responses[1].href, "/calendars/user%40yandex.ru/events-1/");
    }

    #[test]
    fn parses_principal_and_home_hrefs() {
        let xml = r#"<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/</D:href>
    <D:propstat><D:prop>
      <D:current-user-principal><D:href>/principals/users/alice/</D:href></D:current-user-principal>
      <C:calendar-home-set><D:href>/calendars/alice/</D:href></C:calendar-home-set>
    </D:prop></D:propstat>
  </D:response>
</D:multistatus>"#;

        let responses = parse_multistatus(xml).expect("parse");
        assert_eq!(responses[0].href, "/");
        assert_eq!(
            responses[0].principal_href.as_deref(),
            Some("/principals/users/alice/")
        );
        assert_eq!(
            responses[0].calendar_home_href.as_deref(),
            Some("/calendars/alice/")
        );
    }

    #[test]
    fn parses_etag_and_cdata_calendar_data() {
        let xml = r#"<multistatus xmlns="DAV:">
  <response>
    <href>/cal/e1.ics</href>
    <propstat><prop>
      <getetag>"abc123"</getetag>
      <calendar-data xmlns="urn:ietf:params:xml:ns:caldav"><![CDATA[BEGIN:VCALENDAR
END:VCALENDAR]]></calendar-data>
    </prop></propstat>
  </response>
</multistatus>"#;

        let responses = parse_multistatus(xml).expect("parse");
        assert_eq!(responses[0].etag.as_deref(), Some("\"abc123\""));
        assert!(
            responses[0]
                .calendar_data
                .as_deref()
                .is_some_and(|d| d.starts_with("BEGIN:VCALENDAR"))
        );
    }

    #[test]
    fn unescapes_entity_encoded_calendar_data() {
        let xml = r#"<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/cal/e1.ics</D:href>
    <D:propstat><D:prop>
      <D:getetag>&quot;e1&quot;</D:getetag>
      <C:calendar-data>BEGIN:VCALENDAR
SUMMARY:Tom &amp; Jerry
END:VCALENDAR</C:calendar-data>
    </D:prop></D:propstat>
  </D:response>
</D:multistatus>"#;

        let responses = parse_multistatus(xml).expect("parse");
        assert_eq!(responses[0].etag.as_deref(), Some("\"e1\""));
        assert!(
            responses[0]
                .calendar_data
                .as_deref()
                .is_some_and(|d| d.contains("Tom & Jerry"))
        );
    }

    #[test]
    fn empty_multistatus_yields_nothing() {
        let xml = r#"<D:multistatus xmlns:D="DAV:"></D:multistatus>"#;
        assert!(parse_multistatus(xml).expect("parse").is_empty());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let xml = "<D:multistatus xmlns:D=\"DAV:\"><D:response></D:multistatus>";
        assert!(matches!(
            parse_multistatus(xml),
            Err(CalDavError::ParseError(_))
        ));
    }
}
