//! CLI command implementations
//!
//! Each command maps onto one manager or session operation and produces
//! a JSON value. Password digests never leave the store through here.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::SessionService;
use crate::collections::{Collections, ListOptions};
use crate::config::StoreConfig;
use crate::observability::init_logging;
use crate::store::{RecordId, RefreshToken, User};

use super::args::{Cli, Command, PostAction, UserAction};
use super::errors::CliResult;
use super::io::write_response;

/// Public view of a user
#[derive(Debug, Serialize)]
struct UserView {
    id: RecordId,
    email: String,
    is_upgraded: bool,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_upgraded: user.is_upgraded,
        }
    }
}

/// Login response: the account plus its new refresh token
#[derive(Debug, Serialize)]
struct LoginView {
    #[serde(flatten)]
    user: UserView,
    refresh_token: String,
    expires_at: chrono::DateTime<chrono::Utc>,
}

impl LoginView {
    fn new(user: User, token: RefreshToken) -> Self {
        Self {
            user: user.into(),
            refresh_token: token.token,
            expires_at: token.expires_at,
        }
    }
}

/// Parse arguments, run the command and print its result
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = resolve_config(&cli)?;
    init_logging(&config.log_config())?;

    let collections = Collections::open(&config)?;
    if cli.reset {
        collections.store.reset()?;
    }

    let data = execute(&cli.command, &collections)?;
    write_response(data)
}

/// Config file (if any) with command-line overrides applied
pub fn resolve_config(cli: &Cli) -> CliResult<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };

    if let Some(database) = &cli.database {
        config.database_path = database.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Run one command against opened collections
pub fn execute(command: &Command, collections: &Collections) -> CliResult<Value> {
    let sessions = SessionService::new(&collections.users, &collections.refresh_tokens);

    let data = match command {
        Command::Init => {
            info!(path = %collections.store.path().display(), "store ready");
            json!({ "path": collections.store.path() })
        }

        Command::Post { action } => post(action, collections)?,
        Command::User { action } => user(action, collections)?,

        Command::Login { email, password } => {
            let (user, token) = sessions.login(email, password)?;
            serde_json::to_value(LoginView::new(user, token))?
        }

        Command::Refresh { token } => {
            let record = sessions.refresh(token)?;
            json!({ "user_id": record.user_id, "expires_at": record.expires_at })
        }

        Command::Revoke { token } => {
            sessions.revoke(token)?;
            Value::Null
        }

        Command::PurgeTokens => {
            let removed = collections.refresh_tokens.purge_expired()?;
            json!({ "removed": removed })
        }
    };

    Ok(data)
}

fn post(action: &PostAction, collections: &Collections) -> CliResult<Value> {
    let posts = &collections.posts;

    let data = match action {
        PostAction::Create { author_id, body } => serde_json::to_value(posts.create(body, *author_id)?)?,

        PostAction::List { author_id, sort } => serde_json::to_value(posts.list(ListOptions {
            author_id: *author_id,
            order: *sort,
        })?)?,

        PostAction::Get { id } => serde_json::to_value(posts.get_by_id(*id)?)?,

        PostAction::Delete { id, author_id } => {
            match author_id {
                Some(requester) => posts.delete_owned(*id, *requester)?,
                None => posts.delete_by_id(*id)?,
            }
            Value::Null
        }
    };

    Ok(data)
}

fn user(action: &UserAction, collections: &Collections) -> CliResult<Value> {
    let users = &collections.users;

    let user = match action {
        UserAction::Create { email, password } => users.create(email, password)?,
        UserAction::Get { email } => users.get_by_email(email)?,
        UserAction::Update { id, email, password } => users.update_credentials(*id, email, password)?,
        UserAction::Upgrade { id } => users.upgrade(*id)?,
        UserAction::Webhook { event, user_id } => match users.apply_billing_event(event, *user_id)? {
            Some(user) => user,
            None => return Ok(Value::Null),
        },
    };

    Ok(serde_json::to_value(UserView::from(user))?)
}
