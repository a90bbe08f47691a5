pub mod password;
pub mod tone;

pub use password::Argon2Credentials;
pub use tone::{generate_tone, ToneError, ToneSynthesizer};
