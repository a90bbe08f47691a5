//! crates/echoverse_core/src/flow.rs
//!
//! The page state machine behind the voice generator front-end.
//!
//! Every user action is an `Event`. `SessionFlow::handle` applies it to a
//! `SessionContext` and returns the page to show next together with the notices
//! to display. Recoverable problems (bad form input, wrong credentials, empty
//! narration text) become notices and leave the session untouched; only
//! failures of the underlying stores are returned as errors.

use chrono::Local;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{AudioClip, NarrationEntry, Page, Session, Tone, User, Voice};
use crate::memory::InMemoryUserDirectory;
use crate::ports::{CredentialHasher, PortError, PortResult, TextToSpeechService, UserDirectory};

pub const ACCEPTED_UPLOAD_EXTENSIONS: [&str; 3] = ["txt", "pdf", "docx"];

//=========================================================================================
// Session Context
//=========================================================================================

/// Where registered users live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryScope {
    /// Each session has its own directory, wiped on logout.
    #[default]
    Session,
    /// One directory shared by every session of the process.
    Process,
}

impl FromStr for DirectoryScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "session" => Ok(DirectoryScope::Session),
            "process" => Ok(DirectoryScope::Process),
            other => Err(format!("'{}' is not a directory scope (session|process)", other)),
        }
    }
}

/// Everything one interactive visit owns: its session data and the user directory it sees.
#[derive(Clone)]
pub struct SessionContext {
    pub session: Session,
    pub directory: Arc<dyn UserDirectory>,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

//=========================================================================================
// Events, Notices and Outcomes
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub display_name: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateForm {
    pub text: String,
    /// Empty selects the default tone.
    pub tone: String,
    /// Empty selects the default voice.
    pub voice: String,
}

#[derive(Debug, Clone)]
pub enum Event {
    Signup(SignupForm),
    Login(LoginForm),
    ShowLogin,
    ShowSignup,
    Upload(Upload),
    Generate(GenerateForm),
    Logout,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Signup(_) => "signup",
            Event::Login(_) => "login",
            Event::ShowLogin => "show_login",
            Event::ShowSignup => "show_signup",
            Event::Upload(_) => "upload",
            Event::Generate(_) => "generate",
            Event::Logout => "logout",
        }
    }
}

/// The form field a notice belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    DisplayName,
    Phone,
    Password,
    ConfirmPassword,
    File,
    Text,
    Tone,
    Voice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Info(String),
    Error { field: Option<Field>, message: String },
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Success(message) | Notice::Info(message) => message,
            Notice::Error { message, .. } => message,
        }
    }
}

/// Result of one transition.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub page: Page,
    pub notices: Vec<Notice>,
}

//=========================================================================================
// Flow Errors
//=========================================================================================

/// Everything that can stop a transition.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("{message}")]
    Validation { field: Field, message: String },

    /// Deliberately the same for unknown users and wrong passwords.
    #[error("Invalid username or password")]
    Authentication,

    #[error("Please enter some text.")]
    EmptyInput,

    #[error("'{event}' is not available on the {page} page")]
    UnexpectedEvent { page: Page, event: &'static str },

    #[error(transparent)]
    Port(#[from] PortError),
}

impl FlowError {
    fn validation(field: Field, message: impl Into<String>) -> Self {
        FlowError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Turns a recoverable error into a notice; store failures are handed back.
    fn into_notice(self) -> PortResult<Notice> {
        let message = self.to_string();
        let field = match self {
            FlowError::Validation { field, .. } => Some(field),
            FlowError::EmptyInput => Some(Field::Text),
            FlowError::Authentication | FlowError::UnexpectedEvent { .. } => None,
            FlowError::Port(err) => return Err(err),
        };
        Ok(Notice::Error { field, message })
    }
}

type FlowResult<T> = Result<T, FlowError>;

//=========================================================================================
// The State Machine
//=========================================================================================

pub struct SessionFlow {
    scope: DirectoryScope,
    shared_directory: Arc<dyn UserDirectory>,
    credentials: Arc<dyn CredentialHasher>,
    speech: Arc<dyn TextToSpeechService>,
}

impl SessionFlow {
    pub fn new(
        scope: DirectoryScope,
        credentials: Arc<dyn CredentialHasher>,
        speech: Arc<dyn TextToSpeechService>,
    ) -> Self {
        Self {
            scope,
            shared_directory: Arc::new(InMemoryUserDirectory::default()),
            credentials,
            speech,
        }
    }

    /// Replaces the directory used for `DirectoryScope::Process`.
    pub fn with_shared_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.shared_directory = directory;
        self
    }

    pub fn scope(&self) -> DirectoryScope {
        self.scope
    }

    /// Starts a new visit on the signup page.
    pub fn open_session(&self) -> SessionContext {
        let directory: Arc<dyn UserDirectory> = match self.scope {
            DirectoryScope::Session => Arc::new(InMemoryUserDirectory::default()),
            DirectoryScope::Process => self.shared_directory.clone(),
        };
        SessionContext {
            session: Session::new(Uuid::new_v4()),
            directory,
        }
    }

    /// Applies one event to the session.
    pub async fn handle(&self, ctx: &mut SessionContext, event: Event) -> PortResult<Outcome> {
        let page = ctx.session.page;
        let event_name = event.name();

        let result = match (page, event) {
            (Page::Signup, Event::Signup(form)) => self.sign_up(ctx, form).await,
            (Page::Login, Event::Login(form)) => self.log_in(ctx, form).await,
            (Page::Signup | Page::Login, Event::ShowLogin) => {
                ctx.session.page = Page::Login;
                Ok(Vec::new())
            }
            (Page::Signup | Page::Login, Event::ShowSignup) => {
                ctx.session.page = Page::Signup;
                Ok(Vec::new())
            }
            (Page::Home, Event::Upload(upload)) => self.upload(ctx, upload),
            (Page::Home, Event::Generate(form)) => self.generate(ctx, form).await,
            (Page::Home, Event::Logout) => self.log_out(ctx).await,
            (page, _) => Err(FlowError::UnexpectedEvent {
                page,
                event: event_name,
            }),
        };

        let notices = match result {
            Ok(notices) => notices,
            Err(err) => {
                warn!(
                    "Session {} rejected '{}' on the {} page: {}",
                    ctx.session.id, event_name, page, err
                );
                vec![err.into_notice()?]
            }
        };

        if ctx.session.page != page {
            info!(
                "Session {} moved from {} to {} after '{}'",
                ctx.session.id, page, ctx.session.page, event_name
            );
        }

        Ok(Outcome {
            page: ctx.session.page,
            notices,
        })
    }

    async fn sign_up(&self, ctx: &mut SessionContext, form: SignupForm) -> FlowResult<Vec<Notice>> {
        const EMPTY: &str = "Username and password cannot be empty.";
        if form.username.is_empty() {
            return Err(FlowError::validation(Field::Username, EMPTY));
        }
        if form.password.is_empty() {
            return Err(FlowError::validation(Field::Password, EMPTY));
        }

        match ctx.directory.get_user(&form.username).await {
            Ok(_) => return Err(duplicate_username()),
            Err(PortError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }

        if form.password != form.confirm_password {
            return Err(FlowError::validation(
                Field::ConfirmPassword,
                "Passwords do not match.",
            ));
        }

        let phone = optional_field(&form.phone);
        if let Some(phone) = &phone {
            validate_phone(phone)?;
        }

        let user = User {
            username: form.username,
            display_name: optional_field(&form.display_name),
            phone,
            password_hash: self.credentials.hash_password(&form.password)?,
        };
        let username = user.username.clone();

        ctx.directory.insert_user(user).await.map_err(|err| match err {
            PortError::Conflict(_) => duplicate_username(),
            other => other.into(),
        })?;

        info!("Registered user '{}' in session {}", username, ctx.session.id);
        ctx.session.page = Page::Login;
        Ok(vec![Notice::Success(
            "Account created! You can now log in.".to_string(),
        )])
    }

    async fn log_in(&self, ctx: &mut SessionContext, form: LoginForm) -> FlowResult<Vec<Notice>> {
        let user = match ctx.directory.get_user(&form.username).await {
            Ok(user) => user,
            Err(PortError::NotFound(_)) => return Err(FlowError::Authentication),
            Err(err) => return Err(err.into()),
        };

        if !self
            .credentials
            .verify_password(&form.password, &user.password_hash)?
        {
            return Err(FlowError::Authentication);
        }

        let greeting = format!(
            "Welcome {}",
            user.display_name.as_deref().unwrap_or(&user.username)
        );
        ctx.session.current_user = Some(user.username);
        ctx.session.page = Page::Home;
        Ok(vec![Notice::Success(greeting)])
    }

    fn upload(&self, ctx: &mut SessionContext, upload: Upload) -> FlowResult<Vec<Notice>> {
        if upload.file_name.trim().is_empty() {
            return Err(FlowError::validation(Field::File, "Choose a file to upload."));
        }

        let extension = Path::new(&upload.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ACCEPTED_UPLOAD_EXTENSIONS.contains(&extension.as_str()) {
            return Err(FlowError::validation(
                Field::File,
                "Only .txt, .pdf and .docx files are supported.",
            ));
        }

        let is_plain_text = match upload.content_type.as_deref() {
            Some(content_type) if !content_type.is_empty() => content_type.starts_with("text/"),
            _ => extension == "txt",
        };

        if !is_plain_text {
            return Ok(vec![Notice::Info(format!(
                "{} received. Only plain-text files prefill the editor.",
                upload.file_name
            ))]);
        }

        ctx.session.draft = decode_text(&upload.bytes);
        Ok(vec![Notice::Info(format!(
            "Loaded {} into the editor.",
            upload.file_name
        ))])
    }

    async fn generate(&self, ctx: &mut SessionContext, form: GenerateForm) -> FlowResult<Vec<Notice>> {
        let text = form.text.trim();
        if text.is_empty() {
            return Err(FlowError::EmptyInput);
        }

        let tone = parse_choice::<Tone>(&form.tone, Field::Tone)?;
        let voice = parse_choice::<Voice>(&form.voice, Field::Voice)?;

        // Tone and voice are remembered for the form but do not shape the audio.
        let wav = self.speech.generate_audio(text).await?;
        let now = Local::now().naive_local();

        ctx.session.history.push(NarrationEntry {
            recorded_at: now,
            text: text.to_string(),
        });
        ctx.session.last_audio = Some(AudioClip {
            wav,
            created_at: now,
        });
        ctx.session.draft = form.text;
        ctx.session.tone = tone;
        ctx.session.voice = voice;

        Ok(vec![Notice::Success("Done! Preview below.".to_string())])
    }

    async fn log_out(&self, ctx: &mut SessionContext) -> FlowResult<Vec<Notice>> {
        if self.scope == DirectoryScope::Session {
            ctx.directory.clear().await?;
        }
        info!(
            "User {:?} logged out of session {}",
            ctx.session.current_user, ctx.session.id
        );
        ctx.session.reset();
        Ok(vec![Notice::Info("You have been logged out.".to_string())])
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn duplicate_username() -> FlowError {
    FlowError::validation(Field::Username, "Username already exists.")
}

fn optional_field(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn validate_phone(phone: &str) -> FlowResult<()> {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX
        .get_or_init(|| Regex::new(r"^\+?[0-9(][0-9 ()-]{5,19}$").expect("Failed to compile phone regex"));

    if !regex.is_match(phone) {
        return Err(FlowError::validation(
            Field::Phone,
            "Phone number can only contain digits, spaces, dashes and parentheses.",
        ));
    }
    Ok(())
}

fn parse_choice<T>(value: &str, field: Field) -> FlowResult<T>
where
    T: FromStr<Err = String> + Default,
{
    if value.trim().is_empty() {
        return Ok(T::default());
    }
    value
        .parse::<T>()
        .map_err(|message| FlowError::validation(field, message))
}

/// UTF-8 decoding that silently drops invalid byte sequences.
pub fn decode_text(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Stores passwords as-is. Only good for checking the flow's behaviour.
    struct PlaintextCredentials;

    impl CredentialHasher for PlaintextCredentials {
        fn hash_password(&self, password: &str) -> PortResult<String> {
            Ok(password.to_string())
        }

        fn verify_password(&self, password: &str, stored: &str) -> PortResult<bool> {
            Ok(password == stored)
        }
    }

    struct FixedSpeech;

    #[async_trait]
    impl TextToSpeechService for FixedSpeech {
        async fn generate_audio(&self, _text: &str) -> PortResult<Vec<u8>> {
            Ok(b"RIFF".to_vec())
        }
    }

    struct BrokenDirectory;

    #[async_trait]
    impl UserDirectory for BrokenDirectory {
        async fn insert_user(&self, _user: User) -> PortResult<()> {
            Err(PortError::Unexpected("disk on fire".to_string()))
        }

        async fn get_user(&self, _username: &str) -> PortResult<User> {
            Err(PortError::Unexpected("disk on fire".to_string()))
        }

        async fn clear(&self) -> PortResult<()> {
            Ok(())
        }
    }

    fn flow(scope: DirectoryScope) -> SessionFlow {
        SessionFlow::new(scope, Arc::new(PlaintextCredentials), Arc::new(FixedSpeech))
    }

    fn signup(username: &str, password: &str, confirm: &str) -> Event {
        Event::Signup(SignupForm {
            username: username.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            ..Default::default()
        })
    }

    fn login(username: &str, password: &str) -> Event {
        Event::Login(LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    fn generate(text: &str) -> Event {
        Event::Generate(GenerateForm {
            text: text.to_string(),
            ..Default::default()
        })
    }

    fn error_field(outcome: &Outcome) -> Option<Field> {
        match outcome.notices.as_slice() {
            [Notice::Error { field, .. }] => *field,
            other => panic!("expected a single error notice, got {:?}", other),
        }
    }

    async fn logged_in(flow: &SessionFlow) -> SessionContext {
        let mut ctx = flow.open_session();
        flow.handle(&mut ctx, signup("alice", "pw1", "pw1")).await.unwrap();
        flow.handle(&mut ctx, login("alice", "pw1")).await.unwrap();
        assert_eq!(ctx.session.page, Page::Home);
        ctx
    }

    #[tokio::test]
    async fn new_sessions_start_on_signup() {
        let ctx = flow(DirectoryScope::Session).open_session();
        assert_eq!(ctx.session.page, Page::Signup);
        assert!(ctx.session.current_user.is_none());
        assert!(ctx.session.history.is_empty());
    }

    #[tokio::test]
    async fn signup_then_login_reaches_home() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = flow.open_session();

        let outcome = flow.handle(&mut ctx, signup("alice", "pw1", "pw1")).await.unwrap();
        assert_eq!(outcome.page, Page::Login);
        assert!(matches!(outcome.notices.as_slice(), [Notice::Success(_)]));

        let outcome = flow.handle(&mut ctx, login("alice", "pw1")).await.unwrap();
        assert_eq!(outcome.page, Page::Home);
        assert_eq!(ctx.session.current_user.as_deref(), Some("alice"));
        assert_eq!(outcome.notices, vec![Notice::Success("Welcome alice".to_string())]);
    }

    #[tokio::test]
    async fn greeting_prefers_the_display_name() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = flow.open_session();
        let form = SignupForm {
            username: "alice".to_string(),
            display_name: "  Alice Liddell ".to_string(),
            password: "pw1".to_string(),
            confirm_password: "pw1".to_string(),
            ..Default::default()
        };
        flow.handle(&mut ctx, Event::Signup(form)).await.unwrap();
        let outcome = flow.handle(&mut ctx, login("alice", "pw1")).await.unwrap();
        assert_eq!(outcome.notices[0].message(), "Welcome Alice Liddell");
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected_and_stays_on_signup() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = flow.open_session();
        flow.handle(&mut ctx, signup("alice", "pw1", "pw1")).await.unwrap();
        flow.handle(&mut ctx, Event::ShowSignup).await.unwrap();

        let outcome = flow.handle(&mut ctx, signup("alice", "pw2", "pw2")).await.unwrap();
        assert_eq!(outcome.page, Page::Signup);
        assert_eq!(error_field(&outcome), Some(Field::Username));
        assert_eq!(outcome.notices[0].message(), "Username already exists.");
    }

    #[tokio::test]
    async fn empty_fields_are_rejected() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = flow.open_session();

        let outcome = flow.handle(&mut ctx, signup("", "pw1", "pw1")).await.unwrap();
        assert_eq!(outcome.page, Page::Signup);
        assert_eq!(error_field(&outcome), Some(Field::Username));

        let outcome = flow.handle(&mut ctx, signup("bob", "", "")).await.unwrap();
        assert_eq!(outcome.page, Page::Signup);
        assert_eq!(error_field(&outcome), Some(Field::Password));
    }

    #[tokio::test]
    async fn mismatched_passwords_are_rejected() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = flow.open_session();
        let outcome = flow.handle(&mut ctx, signup("bob", "pw1", "pw2")).await.unwrap();
        assert_eq!(outcome.page, Page::Signup);
        assert_eq!(error_field(&outcome), Some(Field::ConfirmPassword));
        assert!(ctx.directory.get_user("bob").await.is_err());
    }

    #[tokio::test]
    async fn malformed_phone_is_rejected() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = flow.open_session();
        let form = SignupForm {
            username: "bob".to_string(),
            phone: "call me".to_string(),
            password: "pw1".to_string(),
            confirm_password: "pw1".to_string(),
            ..Default::default()
        };
        let outcome = flow.handle(&mut ctx, Event::Signup(form)).await.unwrap();
        assert_eq!(error_field(&outcome), Some(Field::Phone));

        let form = SignupForm {
            username: "bob".to_string(),
            phone: "+1 (555) 010-9999".to_string(),
            password: "pw1".to_string(),
            confirm_password: "pw1".to_string(),
            ..Default::default()
        };
        let outcome = flow.handle(&mut ctx, Event::Signup(form)).await.unwrap();
        assert_eq!(outcome.page, Page::Login);
        let stored = ctx.directory.get_user("bob").await.unwrap();
        assert_eq!(stored.phone.as_deref(), Some("+1 (555) 010-9999"));
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = flow.open_session();
        flow.handle(&mut ctx, signup("alice", "pw1", "pw1")).await.unwrap();

        let unknown = flow.handle(&mut ctx, login("mallory", "pw1")).await.unwrap();
        assert_eq!(unknown.page, Page::Login);
        assert_eq!(error_field(&unknown), None);

        let wrong = flow.handle(&mut ctx, login("alice", "nope")).await.unwrap();
        assert_eq!(wrong.page, Page::Login);
        assert_eq!(unknown.notices, wrong.notices);
        assert!(ctx.session.current_user.is_none());
    }

    #[tokio::test]
    async fn generate_appends_history_and_keeps_audio() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = logged_in(&flow).await;

        let outcome = flow
            .handle(
                &mut ctx,
                Event::Generate(GenerateForm {
                    text: "  Once upon a time  ".to_string(),
                    tone: "Excited".to_string(),
                    voice: "emma".to_string(),
                }),
            )
            .await
            .unwrap();

        assert_eq!(outcome.page, Page::Home);
        assert_eq!(outcome.notices, vec![Notice::Success("Done! Preview below.".to_string())]);
        assert_eq!(ctx.session.history.len(), 1);
        assert_eq!(ctx.session.history[0].text, "Once upon a time");
        assert_eq!(ctx.session.tone, Tone::Excited);
        assert_eq!(ctx.session.voice, Voice::Emma);
        assert_eq!(ctx.session.last_audio.as_ref().unwrap().wav, b"RIFF".to_vec());
    }

    #[tokio::test]
    async fn blank_text_is_an_empty_input_error() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = logged_in(&flow).await;

        let outcome = flow.handle(&mut ctx, generate("   \n\t")).await.unwrap();
        assert_eq!(outcome.page, Page::Home);
        assert_eq!(error_field(&outcome), Some(Field::Text));
        assert_eq!(outcome.notices[0].message(), "Please enter some text.");
        assert!(ctx.session.history.is_empty());
        assert!(ctx.session.last_audio.is_none());
    }

    #[tokio::test]
    async fn unknown_tone_is_a_validation_error() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = logged_in(&flow).await;
        let outcome = flow
            .handle(
                &mut ctx,
                Event::Generate(GenerateForm {
                    text: "hello".to_string(),
                    tone: "Sarcastic".to_string(),
                    voice: String::new(),
                }),
            )
            .await
            .unwrap();
        assert_eq!(error_field(&outcome), Some(Field::Tone));
        assert!(ctx.session.history.is_empty());
    }

    #[tokio::test]
    async fn logout_clears_session_and_session_scoped_directory() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = logged_in(&flow).await;
        flow.handle(&mut ctx, generate("hello")).await.unwrap();

        let outcome = flow.handle(&mut ctx, Event::Logout).await.unwrap();
        assert_eq!(outcome.page, Page::Signup);
        assert!(ctx.session.history.is_empty());
        assert!(ctx.session.current_user.is_none());
        assert!(ctx.session.last_audio.is_none());
        assert!(ctx.directory.get_user("alice").await.is_err());
    }

    #[tokio::test]
    async fn process_scope_keeps_users_across_logout_and_sessions() {
        let flow = flow(DirectoryScope::Process);
        let mut ctx = logged_in(&flow).await;
        flow.handle(&mut ctx, Event::Logout).await.unwrap();
        assert!(ctx.directory.get_user("alice").await.is_ok());

        let mut other = flow.open_session();
        flow.handle(&mut other, Event::ShowLogin).await.unwrap();
        let outcome = flow.handle(&mut other, login("alice", "pw1")).await.unwrap();
        assert_eq!(outcome.page, Page::Home);
    }

    #[tokio::test]
    async fn session_scope_isolates_directories() {
        let flow = flow(DirectoryScope::Session);
        let _alice = logged_in(&flow).await;

        let mut other = flow.open_session();
        flow.handle(&mut other, Event::ShowLogin).await.unwrap();
        let outcome = flow.handle(&mut other, login("alice", "pw1")).await.unwrap();
        assert_eq!(outcome.page, Page::Login);
    }

    #[tokio::test]
    async fn events_for_other_pages_are_refused() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = flow.open_session();

        let outcome = flow.handle(&mut ctx, generate("sneaky")).await.unwrap();
        assert_eq!(outcome.page, Page::Signup);
        assert!(outcome.notices[0].is_error());

        let outcome = flow.handle(&mut ctx, Event::Logout).await.unwrap();
        assert_eq!(outcome.page, Page::Signup);
        assert!(outcome.notices[0].is_error());

        let mut home = logged_in(&flow).await;
        let outcome = flow.handle(&mut home, Event::ShowSignup).await.unwrap();
        assert_eq!(outcome.page, Page::Home);
    }

    #[tokio::test]
    async fn text_uploads_prefill_the_draft() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = logged_in(&flow).await;

        let upload = Upload {
            file_name: "story.TXT".to_string(),
            content_type: Some("text/plain".to_string()),
            bytes: b"Hello \xff\xfeworld".to_vec(),
        };
        let outcome = flow.handle(&mut ctx, Event::Upload(upload)).await.unwrap();
        assert!(matches!(outcome.notices.as_slice(), [Notice::Info(_)]));
        assert_eq!(ctx.session.draft, "Hello world");
    }

    #[tokio::test]
    async fn binary_uploads_are_accepted_but_not_read() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = logged_in(&flow).await;

        let upload = Upload {
            file_name: "story.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.7".to_vec(),
        };
        let outcome = flow.handle(&mut ctx, Event::Upload(upload)).await.unwrap();
        assert!(!outcome.notices[0].is_error());
        assert!(ctx.session.draft.is_empty());

        let upload = Upload {
            file_name: "story.exe".to_string(),
            content_type: None,
            bytes: Vec::new(),
        };
        let outcome = flow.handle(&mut ctx, Event::Upload(upload)).await.unwrap();
        assert_eq!(error_field(&outcome), Some(Field::File));
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let flow = flow(DirectoryScope::Session);
        let mut ctx = SessionContext {
            session: Session::new(Uuid::new_v4()),
            directory: Arc::new(BrokenDirectory),
        };
        let result = flow.handle(&mut ctx, signup("alice", "pw1", "pw1")).await;
        assert!(matches!(result, Err(PortError::Unexpected(_))));
        assert_eq!(ctx.session.page, Page::Signup);
    }

    #[test]
    fn decode_text_drops_invalid_bytes() {
        assert_eq!(decode_text(b"caf\xc3\xa9"), "café");
        assert_eq!(decode_text(b"a\x80b\xc3"), "ab");
    }

    #[test]
    fn directory_scope_parses() {
        assert_eq!("Process".parse::<DirectoryScope>().unwrap(), DirectoryScope::Process);
        assert_eq!("session".parse::<DirectoryScope>().unwrap(), DirectoryScope::Session);
        assert!("global".parse::<DirectoryScope>().is_err());
    }
}
