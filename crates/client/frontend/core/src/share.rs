//! Share-post generation.

use game_core::{GameConfig, Hints};

use crate::format::hint_square;

const INTENT_URL: &str = "https://twitter.com/intent/tweet";

/// Spoiler-free share text: header plus one row of squares per guess.
///
/// Guesses whose hints are not known yet render as a row of ⬜.
pub fn share_text<'a, I>(game_id: Option<u64>, attempts: u32, guesses: I) -> String
where
    I: IntoIterator<Item = Option<&'a Hints>>,
{
    let id = game_id.map_or_else(|| "?".to_string(), |id| id.to_string());
    let grid: Vec<String> = guesses
        .into_iter()
        .map(|hints| match hints {
            Some(hints) => hints.iter().map(|hint| hint_square(hint.kind)).collect(),
            None => "⬜".repeat(5),
        })
        .collect();

    format!(
        "Cypher #{id} {attempts}/{}\n\n{}\n\nPlay at:",
        GameConfig::MAX_ATTEMPTS,
        grid.join("\n")
    )
}

/// Tweet intent URL carrying `text` and `play_url` as a form-encoded query.
pub fn share_intent_url(text: &str, play_url: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("text", text)
        .append_pair("url", play_url)
        .finish();
    format!("{INTENT_URL}?{query}")
}
