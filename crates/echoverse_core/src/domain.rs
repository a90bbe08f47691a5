//! crates/echoverse_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage, transport or markup format.

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The page a session is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Signup,
    Login,
    Home,
}

impl Page {
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Signup => "signup",
            Page::Login => "login",
            Page::Home => "home",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup" => Ok(Page::Signup),
            "login" => Ok(Page::Login),
            // One of the front-ends called the landing page "app".
            "home" | "app" => Ok(Page::Home),
            other => Err(format!("unknown page '{}'", other)),
        }
    }
}

/// A registered account. Only ever created on signup and read on login.
#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    /// Opaque credential produced by a `CredentialHasher`.
    pub password_hash: String,
}

/// One submitted narration. Appended to the history, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationEntry {
    pub recorded_at: NaiveDateTime,
    pub text: String,
}

impl NarrationEntry {
    /// Minute-precision, human readable timestamp.
    pub fn timestamp(&self) -> String {
        self.recorded_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Friendly,
    Formal,
    Excited,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Neutral, Tone::Friendly, Tone::Formal, Tone::Excited];

    pub fn label(&self) -> &'static str {
        match self {
            Tone::Neutral => "Neutral",
            Tone::Friendly => "Friendly",
            Tone::Formal => "Formal",
            Tone::Excited => "Excited",
        }
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::ALL
            .into_iter()
            .find(|tone| tone.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown tone '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Voice {
    #[default]
    Allison,
    Emma,
    Brian,
    David,
}

impl Voice {
    pub const ALL: [Voice; 4] = [Voice::Allison, Voice::Emma, Voice::Brian, Voice::David];

    pub fn label(&self) -> &'static str {
        match self {
            Voice::Allison => "Allison",
            Voice::Emma => "Emma",
            Voice::Brian => "Brian",
            Voice::David => "David",
        }
    }
}

impl FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Voice::ALL
            .into_iter()
            .find(|voice| voice.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown voice '{}'", s))
    }
}

/// A synthesized clip kept so the page can preview and download it.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub wav: Vec<u8>,
    pub created_at: NaiveDateTime,
}

/// The state scoped to one interactive visit.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub page: Page,
    pub current_user: Option<String>,
    /// Most-recent-last.
    pub history: Vec<NarrationEntry>,
    pub draft: String,
    pub tone: Tone,
    pub voice: Voice,
    pub last_audio: Option<AudioClip>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            page: Page::Signup,
            current_user: None,
            history: Vec::new(),
            draft: String::new(),
            tone: Tone::default(),
            voice: Voice::default(),
            last_audio: None,
        }
    }

    /// Drops everything but the id and returns to the signup page.
    pub fn reset(&mut self) {
        *self = Session::new(self.id);
    }
}
