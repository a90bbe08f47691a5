//! services/studio/src/web/render.rs
//!
//! Server-side HTML for the three pages. Labels and field sets are data, so the
//! signup, login and home pages share one rendering path.

use echoverse_core::{
    domain::{Page, Session, Tone, Voice},
    flow::{Field, Notice, ACCEPTED_UPLOAD_EXTENSIONS},
    history::{escape_text, render_history, HistoryLayout},
};

const REWRITTEN_PLACEHOLDER: &str = "This is the rewritten version of your text.";

//=========================================================================================
// Page Copy
//=========================================================================================

/// One input of a credentials form.
struct FieldSpec {
    name: &'static str,
    label: &'static str,
    input_type: &'static str,
    field: Field,
    required: bool,
}

struct FormSpec {
    title: &'static str,
    action: &'static str,
    submit: &'static str,
    fields: &'static [FieldSpec],
    switch_prompt: &'static str,
    switch_page: &'static str,
    switch_label: &'static str,
}

const SIGNUP_FORM: FormSpec = FormSpec {
    title: "📝 Create an Account",
    action: "/signup",
    submit: "Sign Up",
    fields: &[
        FieldSpec { name: "username", label: "Choose a Username", input_type: "text", field: Field::Username, required: true },
        FieldSpec { name: "display_name", label: "Display Name (optional)", input_type: "text", field: Field::DisplayName, required: false },
        FieldSpec { name: "phone", label: "Phone Number (optional)", input_type: "tel", field: Field::Phone, required: false },
        FieldSpec { name: "password", label: "Choose a Password", input_type: "password", field: Field::Password, required: true },
        FieldSpec { name: "confirm_password", label: "Confirm Password", input_type: "password", field: Field::ConfirmPassword, required: true },
    ],
    switch_prompt: "Already have an account?",
    switch_page: "login",
    switch_label: "Log in",
};

const LOGIN_FORM: FormSpec = FormSpec {
    title: "🔐 Login to AI Voice Generator",
    action: "/login",
    submit: "Login",
    fields: &[
        FieldSpec { name: "username", label: "Username", input_type: "text", field: Field::Username, required: true },
        FieldSpec { name: "password", label: "Password", input_type: "password", field: Field::Password, required: true },
    ],
    switch_prompt: "New here?",
    switch_page: "signup",
    switch_label: "Create an account",
};

const HOME_FIELDS: [Field; 4] = [Field::File, Field::Text, Field::Tone, Field::Voice];

//=========================================================================================
// Entry Point
//=========================================================================================

/// Renders the page the session is on, with the notices from the last transition.
pub fn render_page(session: &Session, notices: &[Notice]) -> String {
    let body = match session.page {
        Page::Signup => credentials_page(&SIGNUP_FORM, notices),
        Page::Login => credentials_page(&LOGIN_FORM, notices),
        Page::Home => home_page(session, notices),
    };
    layout(&body)
}

//=========================================================================================
// Pages
//=========================================================================================

fn credentials_page(form: &FormSpec, notices: &[Notice]) -> String {
    let shown: Vec<Field> = form.fields.iter().map(|spec| spec.field).collect();
    let inputs: String = form
        .fields
        .iter()
        .map(|spec| {
            format!(
                r#"<label>{label}<input type="{kind}" name="{name}"{required}></label>{errors}"#,
                label = spec.label,
                kind = spec.input_type,
                name = spec.name,
                required = if spec.required { " required" } else { "" },
                errors = field_errors(notices, spec.field),
            )
        })
        .collect();

    format!(
        r#"<main class="narrow">
<h1>{title}</h1>
{banner}
<form method="post" action="{action}">{inputs}<button type="submit">{submit}</button></form>
<form method="post" action="/navigate" class="switch">{prompt} <input type="hidden" name="page" value="{page}"><button type="submit" class="link">{switch}</button></form>
</main>"#,
        title = form.title,
        banner = banner(notices, &shown),
        action = form.action,
        inputs = inputs,
        submit = form.submit,
        prompt = form.switch_prompt,
        page = form.switch_page,
        switch = form.switch_label,
    )
}

fn home_page(session: &Session, notices: &[Notice]) -> String {
    let user = escape_text(session.current_user.as_deref().unwrap_or_default());
    let draft = escape_text(&session.draft);
    let accept = ACCEPTED_UPLOAD_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",");

    let tones = options(Tone::ALL.iter().map(Tone::label), session.tone.label());
    let voices = options(Voice::ALL.iter().map(Voice::label), session.voice.label());

    let audio = if session.last_audio.is_some() {
        // The history length changes on every generation, which busts the browser cache.
        format!(
            r#"<div class="audio-wrap"><audio controls src="/speech.wav?v={v}"></audio>
<a class="button" href="/speech.wav?download=true&amp;v={v}" download="speech.wav">⬇️ Download</a></div>"#,
            v = session.history.len()
        )
    } else {
        String::new()
    };

    format!(
        r#"{sidebar}
<main>
<div class="topbar"><h1>🎤 AI Voice Generator - Welcome {user}</h1>
<form method="post" action="/logout"><button type="submit">🚪 Logout</button></form></div>
<p class="caption">Upload a file or paste text, choose a tone and voice, and generate speech. (This demo produces a simple beep as a placeholder.)</p>
{banner}
<form method="post" action="/upload" enctype="multipart/form-data" class="upload">
<label>Drag and drop file here<input type="file" name="file" accept="{accept}"></label>{file_errors}
<button type="submit">Upload</button></form>
<form method="post" action="/generate">
<label>Enter your text here<textarea name="text" rows="6" placeholder="Type or paste text…">{draft}</textarea></label>{text_errors}
<div class="columns"><label>Tone<select name="tone">{tones}</select></label><label>Voice<select name="voice">{voices}</select></label></div>{choice_errors}
<button type="submit">Generate Audiobook</button></form>
{audio}
<h3>Original Text</h3>
<div class="card"><textarea readonly rows="6">{draft}</textarea></div>
<h3>Rewritten Text</h3>
<div class="card"><textarea readonly rows="6">{rewritten}</textarea></div>
<h3>Past Narrations</h3>
{past}
</main>"#,
        sidebar = sidebar(session),
        user = user,
        banner = banner(notices, &HOME_FIELDS),
        accept = accept,
        file_errors = field_errors(notices, Field::File),
        draft = draft,
        text_errors = field_errors(notices, Field::Text),
        tones = tones,
        voices = voices,
        choice_errors = field_errors(notices, Field::Tone) + &field_errors(notices, Field::Voice),
        audio = audio,
        rewritten = REWRITTEN_PLACEHOLDER,
        past = render_history(&session.history, HistoryLayout::PastNarrations),
    )
}

fn sidebar(session: &Session) -> String {
    format!(
        r##"<details class="sidebar"><summary>☰</summary>
<h3>📜 Previous Narrations</h3>
<div class="section">{history}</div>
<h3>❓ Help</h3>
<div class="section"><a class="link" href="#">How to use</a><a class="link" href="#">FAQ</a></div>
<h3>🌐 Connect</h3>
<div class="section"><a class="link" href="https://twitter.com" target="_blank">🐦 Twitter</a><a class="link" href="https://facebook.com" target="_blank">📘 Facebook</a><a class="link" href="mailto:support@example.com">📧 Email</a></div>
</details>"##,
        history = render_history(&session.history, HistoryLayout::Sidebar)
    )
}

//=========================================================================================
// Fragments
//=========================================================================================

fn options<'a>(labels: impl Iterator<Item = &'a str>, selected: &str) -> String {
    labels
        .map(|label| {
            let marker = if label == selected { " selected" } else { "" };
            format!(r#"<option value="{0}"{1}>{0}</option>"#, label, marker)
        })
        .collect()
}

fn notice_markup(notice: &Notice) -> String {
    let class = match notice {
        Notice::Success(_) => "success",
        Notice::Info(_) => "info",
        Notice::Error { .. } => "error",
    };
    format!(
        r#"<div class="notice {}">{}</div>"#,
        class,
        escape_text(notice.message())
    )
}

/// Notices that do not belong to one of the `shown` inputs.
fn banner(notices: &[Notice], shown: &[Field]) -> String {
    notices
        .iter()
        .filter(|notice| match notice {
            Notice::Error { field: Some(field), .. } => !shown.contains(field),
            _ => true,
        })
        .map(notice_markup)
        .collect()
}

fn field_errors(notices: &[Notice], field: Field) -> String {
    notices
        .iter()
        .filter(|notice| matches!(notice, Notice::Error { field: Some(f), .. } if *f == field))
        .map(notice_markup)
        .collect()
}

fn layout(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>AI Voice Generator</title>
<style>{style}</style>
</head>
<body>
{body}
</body>
</html>"#,
        style = STYLE,
        body = body
    )
}

const STYLE: &str = r#"
@keyframes gradientBG { 0% { background-position: 0% 50%; } 50% { background-position: 100% 50%; } 100% { background-position: 0% 50%; } }
body { margin: 0; min-height: 100vh; font-family: 'Poppins', sans-serif; color: white;
  background: linear-gradient(120deg,#1d2671,#c33764,#ff9a9e,#a1c4fd); background-size: 400% 400%;
  animation: gradientBG 18s ease infinite; }
main { max-width: 960px; margin: 0 auto; padding: 48px 24px; }
main.narrow { max-width: 480px; }
label { display: block; margin: 12px 0 4px; }
textarea, input, select { display: block; width: 100%; box-sizing: border-box; margin-top: 4px; padding: 8px;
  background: rgba(0,0,0,0.35); color: white; border: 1px solid rgba(255,255,255,0.25); border-radius: 10px; }
button, a.button { margin-top: 12px; background: #2563eb; color: white; border: none; border-radius: 10px;
  padding: 10px 18px; font-weight: 700; cursor: pointer; text-decoration: none; display: inline-block; }
button:hover, a.button:hover { background: #1e4ed8; }
button.link { background: none; padding: 0; text-decoration: underline; }
.switch { margin-top: 16px; }
.topbar { display: flex; justify-content: space-between; align-items: center; gap: 16px; }
.caption { opacity: .85; }
.columns { display: flex; gap: 16px; }
.columns label { flex: 1; }
.card { padding: 12px; margin: 8px 0; border: 1px solid rgba(255,255,255,.18); border-radius: 12px; background: rgba(255,255,255,.05); }
.notice { padding: 10px 14px; margin: 8px 0; border-radius: 10px; }
.notice.error { background: rgba(220,38,38,.55); }
.notice.success { background: rgba(22,163,74,.55); }
.notice.info { background: rgba(37,99,235,.45); }
.audio-wrap { margin: 16px 0; }
.sidebar { position: fixed; top: 16px; left: 20px; z-index: 10; max-width: 280px;
  background: rgba(10,10,15,0.92); border-radius: 12px; padding: 8px 12px; }
.sidebar summary { cursor: pointer; font-weight: 800; }
.sidebar .hist-item { padding: 10px 12px; margin: 8px 0; border: 1px solid rgba(255,255,255,.18); border-radius: 12px; }
.sidebar .hist-time { font-size: .8em; opacity: .7; }
.sidebar a.link { display: inline-block; margin: 6px 8px 0 0; padding: 6px 10px; color: #fff;
  text-decoration: none; border: 1px solid rgba(255,255,255,.22); border-radius: 10px; }
.muted { opacity: .7; }
"#;
