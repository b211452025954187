//! Server-side HTML for the single page.
//!
//! The page is small enough to build with `format!`; every piece of user
//! text goes through [`escape_html`].

use std::fmt::Write as _;

use sonar_core::{AlertState, ObjectClass};

const STYLE: &str = r"
body, h1, h2, h3, h4, h5, h6, p, div, span, label { color: white; }
body {
    margin: 0;
    min-height: 100vh;
    font-family: sans-serif;
    background: linear-gradient(135deg, #1a2a6c, #b21f1f, #fdbb2d);
}
.main { max-width: 760px; margin: 0 auto; padding: 40px 20px; }
.title {
    text-align: center;
    font-size: 2.5em;
    margin-bottom: 20px;
    text-shadow: 2px 2px 4px #000000;
}
input[type=text] { width: 100%; padding: 10px; box-sizing: border-box; font-size: 16px; }
.actions { display: flex; gap: 10px; margin-top: 10px; }
button { padding: 10px 18px; font-size: 16px; cursor: pointer; }
button:disabled { cursor: not-allowed; opacity: 0.5; }
.result-box {
    padding: 20px;
    border-radius: 10px;
    margin: 20px 0;
    text-align: center;
    font-size: 24px;
    font-weight: bold;
}
.rock-box { background: linear-gradient(135deg, #1D976C, #93F9B9); }
.mine-box { background: linear-gradient(135deg, #ED213A, #93291E); animation: pulse 1.5s infinite; }
@keyframes pulse { 0% { transform: scale(1); } 50% { transform: scale(1.05); } 100% { transform: scale(1); } }
.message { padding: 12px 16px; border-radius: 6px; margin: 12px 0; }
.error { background: rgba(255, 43, 43, 0.35); }
.warning { background: rgba(255, 189, 69, 0.35); }
.success { background: rgba(33, 195, 84, 0.35); }
.status { font-size: 0.9em; opacity: 0.8; }
";

/// What the last action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A classification, plus a speech problem to show under it.
    Detected {
        class: ObjectClass,
        speech_problem: Option<String>,
    },
    /// The signal text did not parse.
    InvalidInput {
        summary: &'static str,
        detail: String,
    },
    ModelUnavailable(String),
    Stopped,
}

/// Everything the page shows.
#[derive(Debug, Clone, Default)]
pub struct PageView<'a> {
    /// Echoed back into the input box.
    pub signal: &'a str,
    pub outcome: Option<Outcome>,
    /// Speech backend problem, shown once.
    pub speech_notice: Option<String>,
    /// Training failure; disables the Detect button.
    pub model_error: Option<&'a str>,
    pub alert_state: AlertState,
}

/// Escape text for use in element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn message(out: &mut String, kind: &str, text: &str) {
    let _ = writeln!(
        out,
        r#"<div class="message {kind}">{}</div>"#,
        escape_html(text)
    );
}

fn outcome_html(out: &mut String, outcome: &Outcome) {
    match outcome {
        Outcome::Detected {
            class,
            speech_problem,
        } => {
            let box_class = match class {
                ObjectClass::Rock => "rock-box",
                ObjectClass::Mine => "mine-box",
            };
            let _ = writeln!(
                out,
                r#"<div class="result-box {box_class}">{}</div>"#,
                escape_html(class.headline())
            );
            if let Some(problem) = speech_problem {
                message(out, "warning", problem);
            }
        }
        Outcome::InvalidInput { summary, detail } => {
            message(out, "error", summary);
            message(out, "error", detail);
        }
        Outcome::ModelUnavailable(reason) => message(out, "error", reason),
        Outcome::Stopped => message(out, "success", "Alert stopped."),
    }
}

/// Render the whole page.
pub fn page(view: &PageView<'_>) -> String {
    let mut body = String::new();

    if let Some(error) = view.model_error {
        message(&mut body, "error", error);
    }
    if let Some(notice) = &view.speech_notice {
        message(
            &mut body,
            "warning",
            &format!("Voice initialization failed: {notice}"),
        );
    }

    let disabled = if view.model_error.is_some() {
        " disabled"
    } else {
        ""
    };
    let _ = write!(
        body,
        r#"<form method="post" action="/detect">
<label for="signal">SONAR Signal :</label>
<input type="text" id="signal" name="signal" value="{signal}" autocomplete="off">
<div class="actions">
<button type="submit"{disabled}>Detect Object</button>
<button type="submit" formaction="/stop">Stop Alert</button>
</div>
</form>
"#,
        signal = escape_html(view.signal),
    );

    if let Some(outcome) = &view.outcome {
        outcome_html(&mut body, outcome);
    }

    if view.alert_state == AlertState::SpeakingLoop {
        body.push_str(r#"<p class="status">Alert sounding. Press Stop Alert to silence it.</p>"#);
        body.push('\n');
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>SONAR Rock or Mine Detector</title>
<style>{STYLE}</style>
</head>
<body>
<div class="main">
<h1 class="title">🎯 SONAR Rock or Mine Detector</h1>
{body}</div>
</body>
</html>
"#
    )
}
