use crate::api::client::DirectoryClient;
use crate::console::dashboard::{Dashboard, NoticeKind};
use crate::console::messages;
use crate::console::table::render_users;
use crate::core::config::Config;
use crate::core::error::DirectoryError;
use crate::stores::session::{
    startup_check, Credentials, FileSessionStore, SessionStatus, SessionStore,
};
use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

type InputLines = Lines<BufReader<Stdin>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Login,
    Dashboard,
}

/// A parsed dashboard command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Refresh,
    Approve(usize),
    Delete(usize),
    Yes,
    No,
    Logout,
    Quit,
    Help,
    Empty,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.as_slice() {
        [] => Command::Empty,
        ["list"] | ["refresh"] => Command::Refresh,
        ["approve", n] => match n.parse() {
            Ok(row) => Command::Approve(row),
            Err(_) => Command::Unknown(line.to_string()),
        },
        ["delete", n] => match n.parse() {
            Ok(row) => Command::Delete(row),
            Err(_) => Command::Unknown(line.to_string()),
        },
        ["yes"] | ["y"] => Command::Yes,
        ["no"] | ["n"] => Command::No,
        ["logout"] => Command::Logout,
        ["quit"] | ["exit"] => Command::Quit,
        ["help"] => Command::Help,
        _ => Command::Unknown(line.to_string()),
    }
}

const HELP: &str = "\
Commands:
  list | refresh      reload the user list from the directory API
  approve <row>       mark the user in that row as approved
  delete <row>        ask to delete the user in that row (must be approved)
  yes | no            answer an open delete confirmation
  logout              drop the cached session and return to login
  quit | exit         leave the console
  help                show this text";

/// The application shell: decides which screen is visible and drives the
/// directory client in response to operator commands.
pub struct Shell {
    session: Arc<dyn SessionStore>,
    client: DirectoryClient,
    screen: Screen,
}

impl Shell {
    pub fn new(config: &Config) -> Result<Self> {
        let session: Arc<dyn SessionStore> =
            Arc::new(FileSessionStore::new(config.session.path.clone()));
        let client = DirectoryClient::new(
            &config.api.base_url,
            Duration::from_secs(config.api.timeout_secs),
            Arc::clone(&session),
        )
        .context("Failed to create directory client")?;

        Ok(Self {
            session,
            client,
            screen: Screen::Login,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        // Loading phase between process start and the first session check
        println!("{}", messages::LOADING);

        // Startup: a valid cached session goes straight to the dashboard;
        // anything else (including a purged invalid token) shows login.
        self.screen = match startup_check(self.session.as_ref()) {
            SessionStatus::Valid(credentials) => {
                info!(username = %credentials.username, "Restored cached session");
                Screen::Dashboard
            }
            SessionStatus::Absent => Screen::Login,
        };

        loop {
            let keep_running = match self.screen {
                Screen::Login => self.run_login(&mut lines).await?,
                Screen::Dashboard => self.run_dashboard(&mut lines).await?,
            };
            if !keep_running {
                println!("Bye.");
                return Ok(());
            }
        }
    }

    /// Login screen. Returns false when the operator quits.
    async fn run_login(&mut self, lines: &mut InputLines) -> Result<bool> {
        println!("regdesk operator console. Type 'quit' to leave.");

        loop {
            let Some(username) = read_line(lines, "username: ").await? else {
                return Ok(false);
            };
            if matches!(username.as_str(), "quit" | "exit") {
                return Ok(false);
            }

            let Some(password) = read_line(lines, "password: ").await? else {
                return Ok(false);
            };

            if username.is_empty() || password.is_empty() {
                println!("{}", messages::FILL_ALL_FIELDS);
                continue;
            }

            match self.client.login(&username, &password).await {
                Ok(message) => {
                    let credentials = Credentials { username, password };
                    if let Err(e) = self.session.save(&credentials) {
                        warn!(error = %e, "Failed to persist session token");
                    }
                    info!(username = %credentials.username, "Login successful");
                    println!(
                        "{}",
                        message.unwrap_or_else(|| messages::LOGIN_SUCCESS.to_string())
                    );
                    self.screen = Screen::Dashboard;
                    return Ok(true);
                }
                Err(DirectoryError::LoginRejected { message }) => {
                    if message.is_empty() {
                        println!("{}", messages::LOGIN_FAILED);
                    } else {
                        println!("{message}");
                    }
                }
                Err(e) if e.is_network() => {
                    warn!(error = %e, "Login request failed at the transport level");
                    println!("{}", messages::LOGIN_NETWORK_ERROR);
                }
                Err(e) => {
                    warn!(error = %e, "Login request rejected");
                    println!("{}", messages::LOGIN_FAILED);
                }
            }
        }
    }

    /// Dashboard screen. Returns false when the operator quits.
    async fn run_dashboard(&mut self, lines: &mut InputLines) -> Result<bool> {
        let mut dashboard = Dashboard::new();

        // one initial fetch when the dashboard appears
        self.refresh(&mut dashboard).await;

        loop {
            self.render(&mut dashboard);

            let Some(line) = read_line(lines, "regdesk> ").await? else {
                return Ok(false);
            };

            match parse_command(&line) {
                Command::Refresh => self.refresh(&mut dashboard).await,
                Command::Approve(row) => match resolve_row(&dashboard, row) {
                    Some(id) => self.approve(&mut dashboard, &id).await,
                    None => println!("No such row: {row}"),
                },
                Command::Delete(row) => match resolve_row(&dashboard, row) {
                    Some(id) => {
                        if let Err(refused) = dashboard.request_delete(&id, Instant::now()) {
                            println!("{refused}");
                        }
                    }
                    None => println!("No such row: {row}"),
                },
                Command::Yes => match dashboard.confirm_delete() {
                    Some(id) => {
                        let result = self.client.delete_user(&id).await;
                        dashboard.finish_delete(&id, result, Instant::now());
                    }
                    None => println!("Nothing to confirm."),
                },
                Command::No => dashboard.cancel_delete(),
                Command::Logout => {
                    if let Err(e) = self.session.clear() {
                        warn!(error = %e, "Failed to clear session store");
                    }
                    info!("Operator logged out");
                    println!("Logged out.");
                    self.screen = Screen::Login;
                    return Ok(true);
                }
                Command::Quit => return Ok(false),
                Command::Help => println!("{HELP}"),
                Command::Empty => {}
                Command::Unknown(text) => {
                    println!("Unknown command: {text}. Type 'help' for commands.")
                }
            }
        }
    }

    async fn refresh(&self, dashboard: &mut Dashboard) {
        if dashboard.begin_refresh() {
            println!("{}", messages::LOADING_USERS);
            let result = self.client.list_users().await;
            dashboard.finish_refresh(result, Instant::now());
        }
    }

    async fn approve(&self, dashboard: &mut Dashboard, id: &str) {
        match dashboard.request_approve(id) {
            Ok(()) => {
                let result = self.client.set_checked(id).await;
                dashboard.finish_approve(id, result, Instant::now());
            }
            Err(refused) => println!("{refused}"),
        }
    }

    fn render(&self, dashboard: &mut Dashboard) {
        dashboard.tick(Instant::now());

        if let Some(notice) = dashboard.notice() {
            let tag = match notice.kind {
                NoticeKind::Success => "ok",
                NoticeKind::Error => "error",
                NoticeKind::Confirm => "confirm",
            };
            println!("[{tag}] {}", notice.message);
        }

        print!("{}", render_users(dashboard));
    }
}

/// Map a 1-based table row number to a user id.
fn resolve_row(dashboard: &Dashboard, row: usize) -> Option<String> {
    if row == 0 {
        return None;
    }
    dashboard.users().get(row - 1).map(|u| u.id.clone())
}

async fn read_line(lines: &mut InputLines, prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let line = lines
        .next_line()
        .await
        .context("Failed to read from stdin")?;
    Ok(line.map(|l| l.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRecord;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("refresh"), Command::Refresh);
        assert_eq!(parse_command("  list  "), Command::Refresh);
        assert_eq!(parse_command("approve 3"), Command::Approve(3));
        assert_eq!(parse_command("delete 1"), Command::Delete(1));
        assert_eq!(parse_command("yes"), Command::Yes);
        assert_eq!(parse_command("n"), Command::No);
        assert_eq!(parse_command("logout"), Command::Logout);
        assert_eq!(parse_command("exit"), Command::Quit);
        assert_eq!(parse_command(""), Command::Empty);
    }

    #[test]
    fn test_parse_command_rejects_bad_rows() {
        assert!(matches!(parse_command("approve x"), Command::Unknown(_)));
        assert!(matches!(parse_command("delete"), Command::Unknown(_)));
        assert!(matches!(parse_command("approve 1 2"), Command::Unknown(_)));
    }

    #[test]
    fn test_resolve_row() {
        let mut dashboard = Dashboard::new();
        let users: Vec<UserRecord> = serde_json::from_str(
            r#"[{"id":"a","full_name":"Ali"},{"id":"b","full_name":"Vali"}]"#,
        )
        .unwrap();
        dashboard.begin_refresh();
        dashboard.finish_refresh(Ok(users), Instant::now());

        assert_eq!(resolve_row(&dashboard, 1).as_deref(), Some("a"));
        assert_eq!(resolve_row(&dashboard, 2).as_deref(), Some("b"));
        assert_eq!(resolve_row(&dashboard, 0), None);
        assert_eq!(resolve_row(&dashboard, 3), None);
    }
}
