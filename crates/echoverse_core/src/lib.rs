pub mod domain;
pub mod flow;
pub mod history;
pub mod memory;
pub mod ports;
pub mod telemetry;

pub use domain::{AudioClip, NarrationEntry, Page, Session, Tone, User, Voice};
pub use flow::{
    DirectoryScope, Event, Field, GenerateForm, LoginForm, Notice, Outcome, SessionContext,
    SessionFlow, SignupForm, Upload,
};
pub use history::{render_history, HistoryLayout};
pub use memory::{InMemorySessionStore, InMemoryUserDirectory};
pub use ports::{
    CredentialHasher, PortError, PortResult, SessionStore, TextToSpeechService, UserDirectory,
};
