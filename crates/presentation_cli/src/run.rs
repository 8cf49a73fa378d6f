//! Command dispatch
//!
//! Turns parsed arguments into service calls. Credentials are resolved
//! first, then dates and other inputs are parsed, all before any request is
//! made.

use std::sync::Arc;

use application::{
    ApplicationError, CalendarSelection, CalendarService, RangeSelector, event_times,
};
use chrono::{DateTime, Local, Utc};
use domain::{
    Credentials, EventUpdate, NewEvent, NewTodo, Priority, SearchFields, SearchQuery,
    parse_datetime_in, parse_tags,
};
use infrastructure::{AppConfig, CalDavCalendarAdapter};
use tracing::debug;

use crate::cli::{AuthArgs, Cli, Command};
use crate::output::{CommandOutput, StatusReport};

/// A command with every input parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListCalendars,
    Events(RangeSelector),
    Create(NewEvent),
    Update { uid: String, update: EventUpdate },
    Delete { uid: String },
    Search(SearchQuery),
    ListTodos,
    CreateTodo(NewTodo),
    CompleteTodo { uid: String },
    DeleteTodo { uid: String },
}

impl Request {
    /// Parse command arguments relative to `now`
    pub fn from_command(command: &Command, now: DateTime<Utc>) -> Result<Self, ApplicationError> {
        let request = match command {
            Command::ListCalendars => Self::ListCalendars,
            Command::Events(args) => Self::Events(if args.today {
                RangeSelector::Today
            } else if args.from.is_none() && args.to.is_none() {
                RangeSelector::Upcoming
            } else {
                RangeSelector::Between {
                    from: parse_optional(args.from.as_deref(), now)?,
                    to: parse_optional(args.to.as_deref(), now)?,
                }
            }),
            Command::Create(args) => {
                let (start, end) = event_times(
                    parse_optional(args.start.as_deref(), now)?,
                    parse_optional(args.end.as_deref(), now)?,
                    now,
                );
                Self::Create(NewEvent {
                    title: args.title.clone(),
                    start,
                    end,
                    description: args.description.clone(),
                    location: args.location.clone(),
                    rrule: args.rrule.clone(),
                    reminder_minutes: args.reminder,
                })
            },
            Command::Update(args) => Self::Update {
                uid: args.uid.value().to_string(),
                update: EventUpdate {
                    title: args.title.clone(),
                    start: parse_optional(args.start.as_deref(), now)?,
                    end: parse_optional(args.end.as_deref(), now)?,
                    description: args.description.clone(),
                    location: args.location.clone(),
                },
            },
            Command::Delete(uid) => Self::Delete {
                uid: uid.value().to_string(),
            },
            Command::Search(args) => {
                let fields: SearchFields = args.fields.parse()?;
                let range = if args.from.is_none() && args.to.is_none() {
                    None
                } else {
                    let selector = RangeSelector::Between {
                        from: parse_optional(args.from.as_deref(), now)?,
                        to: parse_optional(args.to.as_deref(), now)?,
                    };
                    Some(selector.resolve(now)?)
                };
                Self::Search(SearchQuery::new(args.query.value(), fields, range)?)
            },
            Command::ListTodos => Self::ListTodos,
            Command::CreateTodo(args) => Self::CreateTodo(NewTodo {
                title: args.title.clone(),
                description: args.description.clone(),
                tags: args.tags.as_deref().map(parse_tags).unwrap_or_default(),
                priority: Priority::new(args.priority)?,
                due: parse_optional(args.due.as_deref(), now)?,
            }),
            Command::CompleteTodo(uid) => Self::CompleteTodo {
                uid: uid.value().to_string(),
            },
            Command::DeleteTodo(uid) => Self::DeleteTodo {
                uid: uid.value().to_string(),
            },
        };
        Ok(request)
    }
}

fn parse_optional(
    input: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, ApplicationError> {
    input
        .map(|value| parse_datetime_in(value, &Local, now))
        .transpose()
        .map_err(Into::into)
}

/// Resolve credentials from flags and environment
pub fn credentials(auth: &AuthArgs) -> Result<Credentials, ApplicationError> {
    Ok(Credentials::resolve(
        auth.username.clone(),
        auth.password.clone(),
        auth.oauth_token.clone(),
        auth.user_id.clone(),
    )?)
}

/// Run one parsed request against the service
pub async fn execute(
    service: &CalendarService,
    calendar: Option<&str>,
    request: Request,
    now: DateTime<Utc>,
) -> Result<CommandOutput, ApplicationError> {
    let output = match request {
        Request::ListCalendars => CommandOutput::Calendars(service.list_calendars().await?),
        Request::Events(selector) => {
            let range = selector.resolve(now)?;
            CommandOutput::Events(service.events(calendar, range).await?)
        },
        Request::Create(event) => CommandOutput::Event(service.create_event(calendar, &event).await?),
        Request::Update { uid, update } => {
            CommandOutput::Event(service.update_event(calendar, &uid, &update).await?)
        },
        Request::Delete { uid } => {
            service.delete_event(calendar, &uid).await?;
            CommandOutput::Status(StatusReport::deleted(uid))
        },
        Request::Search(query) => CommandOutput::Events(service.search(calendar, &query).await?),
        Request::ListTodos => CommandOutput::Todos(service.list_todos(calendar).await?),
        Request::CreateTodo(todo) => CommandOutput::Todo(service.create_todo(calendar, &todo).await?),
        Request::CompleteTodo { uid } => {
            let completion = service.complete_todo(calendar, &uid).await?;
            CommandOutput::Status(StatusReport::completed(&completion))
        },
        Request::DeleteTodo { uid } => {
            service.delete_todo(calendar, &uid).await?;
            CommandOutput::Status(StatusReport::deleted(uid))
        },
    };
    Ok(output)
}

/// Load configuration, build the service and run the command
///
/// Returns the rendered output for stdout.
pub async fn run(cli: Cli) -> Result<String, ApplicationError> {
    let config = AppConfig::load(cli.config.as_deref())
        .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
    let format = cli.format.unwrap_or(config.output.format);
    let now = Utc::now();

    let credentials = credentials(&cli.auth)?;
    let request = Request::from_command(&cli.command, now)?;
    debug!(?request, auth = credentials.auth().kind(), "Dispatching command");

    let adapter = Arc::new(CalDavCalendarAdapter::connect(&config.caldav, credentials)?);
    let service = CalendarService::new(
        adapter.clone(),
        adapter,
        CalendarSelection {
            default_calendar: config.calendar.default_calendar,
            todo_calendar: config.calendar.todo_calendar,
        },
    );

    let output = execute(&service, cli.calendar.as_deref(), request, now).await?;
    output.render(format)
}
