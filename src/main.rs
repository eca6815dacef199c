use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use playerdesk::api::{LoginOptions, SignupOptions};
use playerdesk::pages::dashboard::load_dashboard;
use playerdesk::pages::details::{DetailsPage, Moderation};
use playerdesk::pages::login::{FormResult, LoginForm, SignupForm, quick_logout, submit_login, submit_signup};
use playerdesk::{
    ApiClient, ApiError, ConfigError, ConsoleConfig, ErrorCode, FileStorage, Guarded, Route, RouteGuard,
    SessionError, SessionStore,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("reading input failed: {0}")]
    Input(#[from] io::Error),
    #[error("unknown route: {0}")]
    UnknownRoute(String),
    #[error("not logged in; redirected to {0}")]
    Redirected(Route),
    #[error("{0}")]
    Form(String),
    #[error("{0}")]
    Alert(String),
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(err) => err.error_code(),
            Self::Api(err) => err.error_code(),
            Self::Session(err) => err.error_code(),
            Self::Input(_) => "E_INPUT",
            Self::UnknownRoute(_) => "E_UNKNOWN_ROUTE",
            Self::Redirected(_) => "E_NOT_LOGGED_IN",
            Self::Form(_) => "E_FORM",
            Self::Alert(_) => "E_ACTION_FAILED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Api(err) => err.retryable(),
            _ => false,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "playerdesk", about = "Operator console for the player service")]
struct Cli {
    /// API root; overrides PLAYERDESK_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Session storage file; overrides PLAYERDESK_STORAGE.
    #[arg(long)]
    storage: Option<std::path::PathBuf>,

    /// Login/signup deadline in milliseconds; overrides PLAYERDESK_TIMEOUT_MS.
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session.
    Login {
        username: String,
        #[arg(long, env = "PLAYERDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Send the configured cookie with the request.
        #[arg(long, default_value_t = false)]
        with_credentials: bool,
    },
    /// Create an account. Does not log in.
    Signup {
        username: String,
        #[arg(long, env = "PLAYERDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Password confirmation; defaults to the password.
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Forget the stored session.
    Logout,
    /// Show the stored session.
    Whoami,
    /// Player counts, active users and banned users.
    Dashboard,
    /// One player's record.
    Player { username: String },
    /// Ban a player, then show the refreshed record.
    Ban { username: String },
    /// Lift a ban, then show the refreshed record.
    Unban { username: String },
    /// Navigate to a route path such as `/home` or `/details/ada`.
    Open { path: String },
}

struct Console {
    api: ApiClient,
    guard: RouteGuard,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let hint = if err.retryable() { " (retryable)" } else { "" };
            eprintln!("error[{}]: {err}{hint}", err.error_code());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ConsoleConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = playerdesk::config::normalize_base_url(&base_url)?;
    }
    if let Some(path) = cli.storage {
        config.storage_path = path;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.auth_timeout_ms = timeout_ms;
    }
    tracing::debug!(base_url = %config.base_url, storage = %config.storage_path.display(), "console configured");

    let sessions = SessionStore::new(Arc::new(FileStorage::new(&config.storage_path)));
    let console = Console {
        api: ApiClient::new(&config, sessions.clone())?,
        guard: RouteGuard::new(sessions),
    };

    match cli.command {
        Command::Login { username, password, with_credentials } => {
            let password = password_or_prompt(password)?;
            let options = LoginOptions { timeout: None, include_credentials: with_credentials };
            run_login(&console, LoginForm { username, password }, options).await
        }
        Command::Signup { username, password, confirm } => {
            let password = password_or_prompt(password)?;
            let confirm = confirm.unwrap_or_else(|| password.clone());
            run_signup(&console, SignupForm { username, password, confirm }).await
        }
        Command::Logout => {
            let route = quick_logout(console.api.sessions())?;
            println!("logged out; now at {route}");
            Ok(())
        }
        Command::Whoami => run_whoami(&console),
        Command::Dashboard => open(&console, Route::Home).await,
        Command::Player { username } => open(&console, Route::Details(username)).await,
        Command::Ban { username } => run_moderation(&console, username, Moderation::Ban).await,
        Command::Unban { username } => run_moderation(&console, username, Moderation::Unban).await,
        Command::Open { path } => {
            let route = Route::parse(&path).ok_or(CliError::UnknownRoute(path))?;
            open(&console, route).await
        }
    }
}

async fn run_login(console: &Console, form: LoginForm, options: LoginOptions) -> Result<(), CliError> {
    match submit_login(&console.api, &form, options).await {
        FormResult::Navigate(route) => {
            println!("logged in as {}", form.username);
            open(console, route).await
        }
        FormResult::Notice(message) => {
            println!("{message}");
            Ok(())
        }
        FormResult::Error(message) => Err(CliError::Form(message)),
    }
}

async fn run_signup(console: &Console, form: SignupForm) -> Result<(), CliError> {
    match submit_signup(&console.api, &form, SignupOptions::default()).await {
        FormResult::Notice(message) => {
            println!("{message}");
            Ok(())
        }
        FormResult::Navigate(route) => open(console, route).await,
        FormResult::Error(message) => Err(CliError::Form(message)),
    }
}

fn run_whoami(console: &Console) -> Result<(), CliError> {
    match console.api.sessions().get_session()? {
        Some(session) if session.grants_access() => {
            println!("{}", session.username);
            if let Some(message) = session.message {
                println!("last server message: {message}");
            }
            Ok(())
        }
        _ => Err(CliError::Redirected(Route::Login)),
    }
}

/// Render `route`, sending protected routes through the guard first.
async fn open(console: &Console, route: Route) -> Result<(), CliError> {
    let route = match console.guard.navigate(route)? {
        Guarded::Render(route) => route,
        Guarded::Redirect(to) => return Err(CliError::Redirected(to)),
    };
    match route {
        Route::Login => {
            println!("Login: run `playerdesk login <username>` or `playerdesk signup <username>`");
        }
        Route::Home => {
            let page = load_dashboard(&console.api).await?;
            print!("{page}");
        }
        Route::Details(username) => {
            let page = DetailsPage::load(&console.api, &username).await;
            println!("{page}");
        }
    }
    Ok(())
}

async fn run_moderation(console: &Console, username: String, action: Moderation) -> Result<(), CliError> {
    let guarded = console.guard.guard(Route::Details(username))?;
    let Guarded::Render(Route::Details(username)) = guarded else {
        return Err(CliError::Redirected(Route::Login));
    };

    let mut page = DetailsPage::load(&console.api, &username).await;
    if page.player().is_none() {
        println!("{page}");
    }
    let message = page.moderate(&console.api, action).await.map_err(CliError::Alert)?;
    println!("{message}");
    println!("{page}");
    Ok(())
}

fn password_or_prompt(password: Option<String>) -> Result<String, CliError> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
