//! Line-oriented terminal front end. Probes the session once, then loops:
//! the routing gate picks the page, the page is rendered as text and input is
//! read one line at a time. Lines starting with `:` are navigation commands
//! (`:login`, `:signup`, `:home`, `:verify`, `:submit`, `:logout`, `:quit`).
//!
//! On the verification page each line is one key event for the focused slot:
//! a single character types it, a longer line is a paste, and an empty line is
//! backspace.
//!
//! Passwords go through a hidden reader when one is installed, so they are not
//! echoed. Without one they are read as ordinary lines.

use crate::{
    api::AuthApi,
    pages::{DashboardPage, LoginPage, Notice, Outcome, SignupPage, VerifyEmailPage},
    routing::{self, Route},
    session::SessionStore,
    verification::VerificationCode,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Text(String),
    Command(Command),
    Eof,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Go(Route),
    Submit,
    Logout,
    Quit,
    Unknown(String),
}

fn parse_line(text: &str) -> Line {
    let trimmed = text.trim();
    let Some(command) = trimmed.strip_prefix(':') else {
        return Line::Text(text.to_string());
    };

    Line::Command(match command {
        "home" | "dashboard" => Command::Go(Route::Dashboard),
        "login" => Command::Go(Route::Login),
        "signup" => Command::Go(Route::Signup),
        "verify" => Command::Go(Route::VerifyEmail),
        "submit" => Command::Submit,
        "logout" => Command::Logout,
        "q" | "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    })
}

/// Blocking password prompt that reads without echo. Gets the field label.
pub type HiddenReader = Box<dyn FnMut(&str) -> io::Result<String> + Send>;

pub struct Terminal<'a, A, R, W> {
    store: &'a SessionStore<A>,
    lines: Lines<R>,
    out: W,
    cancel: CancellationToken,
    hidden: Option<HiddenReader>,
}

impl<'a, A, R, W> Terminal<'a, A, R, W>
where
    A: AuthApi,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(store: &'a SessionStore<A>, input: R, out: W) -> Self {
        Self {
            store,
            lines: input.lines(),
            out,
            cancel: CancellationToken::new(),
            hidden: None,
        }
    }

    /// Uses `cancel` to abandon in-flight calls and stop reading input.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Reads passwords with `reader` instead of the line input. The reader
    /// blocks, so the terminal must run on a multi-threaded runtime.
    #[must_use]
    pub fn with_hidden_input(
        mut self,
        reader: impl FnMut(&str) -> io::Result<String> + Send + 'static,
    ) -> Self {
        self.hidden = Some(Box::new(reader));
        self
    }

    /// Runs until the user quits, input ends or the token is cancelled, and
    /// hands the writer back.
    ///
    /// # Errors
    /// Returns an error if reading input or writing output fails.
    pub async fn run(mut self, start: Route) -> Result<W> {
        if let Err(err) = self.store.check_auth_with_cancel(&self.cancel).await {
            debug!(error = %err, "no active session");
        }

        let mut route = start;
        while !self.cancel.is_cancelled() {
            let Some(page) = routing::land(route.clone(), &self.store.session()) else {
                let mut updates = self.store.subscribe();
                updates
                    .wait_for(|session| !session.is_checking_auth)
                    .await
                    .context("session store closed")?;
                continue;
            };

            debug!(path = page.path(), "rendering page");
            let next = match page {
                Route::Dashboard => self.dashboard().await?,
                Route::Signup => self.signup().await?,
                Route::Login => self.login().await?,
                Route::VerifyEmail => self.verify_email().await?,
                Route::NotFound(path) => self.not_found(&path).await?,
            };

            match next {
                Some(next) => route = next,
                None => break,
            }
        }

        Ok(self.out)
    }

    async fn signup(&mut self) -> Result<Option<Route>> {
        self.heading("Create Account")?;
        self.show_error()?;
        writeln!(self.out, "Already have an account? Type :login")?;

        let mut page = SignupPage::new();
        page.name = match self.read("Full Name: ").await? {
            Line::Text(text) => text,
            other => return self.follow(other, Route::Signup),
        };
        page.email = match self.read("Email Address: ").await? {
            Line::Text(text) => text,
            other => return self.follow(other, Route::Signup),
        };
        match self.read_password("Password").await? {
            Line::Text(text) => page.set_password(SecretString::from(text)),
            other => return self.follow(other, Route::Signup),
        }

        let outcome = page.submit(self.store, &self.cancel).await;
        Ok(Some(self.apply(outcome)?.unwrap_or(Route::Signup)))
    }

    async fn login(&mut self) -> Result<Option<Route>> {
        self.heading("Welcome Back")?;
        self.show_error()?;
        writeln!(self.out, "Don't have an account? Type :signup")?;

        let mut page = LoginPage::new();
        page.email = match self.read("Email Address: ").await? {
            Line::Text(text) => text,
            other => return self.follow(other, Route::Login),
        };
        match self.read_password("Password").await? {
            Line::Text(text) => page.set_password(SecretString::from(text)),
            other => return self.follow(other, Route::Login),
        }

        let outcome = page.submit(self.store, &self.cancel).await;
        Ok(Some(self.apply(outcome)?.unwrap_or(Route::Login)))
    }

    async fn verify_email(&mut self) -> Result<Option<Route>> {
        self.heading("Verify Your Email")?;
        writeln!(
            self.out,
            "Enter the 6-digit code sent to your email address."
        )?;

        let mut page = VerifyEmailPage::new();
        loop {
            self.render_code(&page.code)?;
            let focus = page.code.focus();
            let completed = match self.read(&format!("Slot {}: ", focus + 1)).await? {
                Line::Text(text) => match text.chars().count() {
                    0 if page.code.slots()[focus].is_empty() => {
                        page.code.backspace(focus);
                        None
                    }
                    0 => page.code.input(focus, ""),
                    1 => page.code.input(focus, &text),
                    _ => page.code.paste(&text),
                },
                Line::Command(Command::Submit) => {
                    match page.submit_current(self.store, &self.cancel).await {
                        Some(outcome) => {
                            if let Some(route) = self.apply(outcome)? {
                                return Ok(Some(route));
                            }
                        }
                        None => writeln!(self.out, "Enter all six characters first.")?,
                    }
                    None
                }
                other => return self.follow(other, Route::VerifyEmail),
            };

            if let Some(code) = completed {
                writeln!(self.out, "Verifying...")?;
                let outcome = VerifyEmailPage::submit(self.store, &code, &self.cancel).await;
                if let Some(route) = self.apply(outcome)? {
                    return Ok(Some(route));
                }
            }
        }
    }

    async fn dashboard(&mut self) -> Result<Option<Route>> {
        self.heading("Dashboard")?;
        if let Some(profile) = DashboardPage::profile(&self.store.session()) {
            writeln!(self.out, "Profile Information")?;
            writeln!(self.out, "  Name: {}", profile.name)?;
            writeln!(self.out, "  Email: {}", profile.email)?;
            writeln!(self.out, "Account Activity")?;
            writeln!(self.out, "  Joined: {}", profile.joined)?;
            writeln!(self.out, "  Last Login: {}", profile.last_login)?;
        }

        loop {
            match self.read("Type :logout to sign out or :quit to exit: ").await? {
                Line::Command(Command::Logout) => {
                    let outcome = DashboardPage::logout(self.store, &self.cancel).await;
                    if let Some(route) = self.apply(outcome)? {
                        return Ok(Some(route));
                    }
                }
                Line::Text(_) => {}
                other => return self.follow(other, Route::Dashboard),
            }
        }
    }

    async fn not_found(&mut self, path: &str) -> Result<Option<Route>> {
        self.heading("Page not found")?;
        writeln!(self.out, "Nothing lives at {path}. Type :home to go back.")?;
        match self.read("> ").await? {
            Line::Text(_) => Ok(Some(Route::NotFound(path.to_string()))),
            other => self.follow(other, Route::NotFound(path.to_string())),
        }
    }

    /// Reads one line, or `Eof` when input ends or the token is cancelled.
    async fn read(&mut self, prompt: &str) -> Result<Line> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;

        let line = tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            line = self.lines.next_line() => line.context("failed to read input")?,
        };

        Ok(line.map_or(Line::Eof, |text| parse_line(&text)))
    }

    /// Hidden input is taken verbatim; `:` commands only work on the line
    /// input.
    async fn read_password(&mut self, label: &str) -> Result<Line> {
        self.out.flush()?;
        if let Some(reader) = self.hidden.as_mut() {
            let text =
                tokio::task::block_in_place(|| reader(label)).context("failed to read password")?;
            if self.cancel.is_cancelled() {
                return Ok(Line::Eof);
            }
            return Ok(Line::Text(text));
        }

        self.read(&format!("{label}: ")).await
    }

    /// Resolves a command read on page `here`; `None` ends the session.
    fn follow(&mut self, line: Line, here: Route) -> Result<Option<Route>> {
        match line {
            Line::Eof | Line::Command(Command::Quit) => Ok(None),
            Line::Command(Command::Go(route)) => Ok(Some(route)),
            Line::Command(Command::Unknown(command)) => {
                writeln!(self.out, "Unknown command :{command}")?;
                Ok(Some(here))
            }
            Line::Command(Command::Submit | Command::Logout) | Line::Text(_) => Ok(Some(here)),
        }
    }

    fn apply(&mut self, outcome: Outcome) -> Result<Option<Route>> {
        match outcome.notice {
            Some(Notice::Success(message)) => writeln!(self.out, "[ok] {message}")?,
            Some(Notice::Error(message)) => writeln!(self.out, "[error] {message}")?,
            None => {}
        }
        Ok(outcome.navigate)
    }

    fn heading(&mut self, title: &str) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "== {title} ==")?;
        Ok(())
    }

    fn show_error(&mut self) -> Result<()> {
        if let Some(error) = self.store.session().error {
            writeln!(self.out, "[error] {error}")?;
        }
        Ok(())
    }

    fn render_code(&mut self, code: &VerificationCode) -> Result<()> {
        let rendered: String = code
            .slots()
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                let value = if slot.is_empty() { "_" } else { slot.as_str() };
                if index == code.focus() {
                    format!(">{value}<")
                } else {
                    format!("[{value}]")
                }
            })
            .collect();
        writeln!(self.out, "{rendered}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fake::{FakeApi, auth, rejected, verified};

    async fn run_script(store: &SessionStore<FakeApi>, script: &str) -> Result<String> {
        let out = Terminal::new(store, script.as_bytes(), Vec::new())
            .run(Route::Dashboard)
            .await?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn parse_line_commands_and_text() {
        assert_eq!(parse_line(":login"), Line::Command(Command::Go(Route::Login)));
        assert_eq!(parse_line("  :quit "), Line::Command(Command::Quit));
        assert_eq!(
            parse_line(":nope"),
            Line::Command(Command::Unknown("nope".to_string()))
        );
        assert_eq!(parse_line(" 12 "), Line::Text(" 12 ".to_string()));
        assert_eq!(parse_line(""), Line::Text(String::new()));
    }

    #[tokio::test]
    async fn signup_verify_dashboard_logout_flow() -> Result<()> {
        let api = FakeApi::new();
        api.push_check(Err(rejected(401, Some("Unauthorized"))));
        api.push_signup(Ok(auth("1", false)));
        api.push_verify(Ok(verified("1")));
        api.push_logout(Ok(()));
        let store = SessionStore::new(api);

        let output = run_script(
            &store,
            ":signup\nA\na@b.com\nx\n123456\n:logout\n:quit\n",
        )
        .await?;

        assert!(output.contains("== Welcome Back =="));
        assert!(output.contains("== Create Account =="));
        assert!(output.contains("== Verify Your Email =="));
        assert!(output.contains("[ok] Email verified successfully!"));
        assert!(output.contains("Name: User 1"));
        assert!(output.contains("[ok] Logged out successfully"));
        assert_eq!(store.api().submitted_codes(), vec!["123456".to_string()]);
        assert!(!store.session().is_authenticated);
        Ok(())
    }

    #[tokio::test]
    async fn typed_digits_with_backspace_and_rejection() -> Result<()> {
        let api = FakeApi::new();
        api.push_check(Ok(auth("1", false)));
        api.push_verify(Err(rejected(400, Some("Invalid code"))));
        let store = SessionStore::new(api);

        let output = run_script(&store, "1\n2\n3\n\n\n9\n4\n5\n6\n:quit\n").await?;

        assert_eq!(store.api().submitted_codes(), vec!["129456".to_string()]);
        assert!(output.contains("[error] Invalid code"));
        assert!(output.contains("[1][2]>_<[_][_][_]"));
        assert_eq!(store.session().error.as_deref(), Some("Invalid code"));
        Ok(())
    }

    #[tokio::test]
    async fn failed_login_redisplays_form_with_error() -> Result<()> {
        let api = FakeApi::new();
        api.push_check(Err(rejected(401, None)));
        api.push_login(Err(rejected(400, Some("Invalid credentials"))));
        let store = SessionStore::new(api);

        let output = run_script(&store, "a@b.com\nwrong\n").await?;

        assert_eq!(output.matches("== Welcome Back ==").count(), 2);
        assert!(output.contains("[error] Invalid credentials"));
        assert!(!output.contains("wrong"));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn hidden_reader_supplies_password_without_echo() -> Result<()> {
        let api = FakeApi::new();
        api.push_check(Err(rejected(401, None)));
        api.push_login(Ok(auth("1", true)));
        let store = SessionStore::new(api);
        let labels = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = labels.clone();

        let out = Terminal::new(&store, "a@b.com\n:quit\n".as_bytes(), Vec::new())
            .with_hidden_input(move |label| {
                if let Ok(mut seen) = seen.lock() {
                    seen.push(label.to_string());
                }
                Ok("hunter2".to_string())
            })
            .run(Route::Login)
            .await?;
        let output = String::from_utf8_lossy(&out);

        assert_eq!(*labels.lock().unwrap(), vec!["Password".to_string()]);
        assert!(!output.contains("Password: "));
        assert!(!output.contains("hunter2"));
        assert!(output.contains("== Dashboard =="));
        assert!(store.session().is_authenticated);
        Ok(())
    }

    #[tokio::test]
    async fn verified_session_skips_auth_pages() -> Result<()> {
        let api = FakeApi::new();
        api.push_check(Ok(auth("1", true)));
        let store = SessionStore::new(api);

        let output = run_script(&store, ":login\n:somewhere\n:quit\n").await?;

        assert!(!output.contains("== Welcome Back =="));
        assert_eq!(output.matches("== Dashboard ==").count(), 3);
        assert!(output.contains("Unknown command :somewhere"));
        Ok(())
    }

    #[tokio::test]
    async fn cancelled_terminal_stops_reading() -> Result<()> {
        let api = FakeApi::new();
        api.push_check(Err(rejected(401, None)));
        let store = SessionStore::new(api);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let out = Terminal::new(&store, "a@b.com\n".as_bytes(), Vec::new())
            .with_cancel(cancel)
            .run(Route::Dashboard)
            .await?;

        assert!(out.is_empty());
        Ok(())
    }
}
