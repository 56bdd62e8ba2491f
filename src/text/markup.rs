//! Minimal markup handling
//!
//! Label text may carry Pango-style markup (`<b>`, `<span color='red'>`,
//! `&amp;` ...). The bitmap font has no styling, so tags are dropped and the
//! standard entities are decoded. Broken markup is drawn as typed.

/// Why a markup string could not be interpreted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("unterminated tag starting at byte {0}")]
    UnterminatedTag(usize),

    #[error("unknown entity '&{0};'")]
    UnknownEntity(String),

    #[error("unterminated entity starting at byte {0}")]
    UnterminatedEntity(usize),
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}

/// Removes tags and decodes entities
pub fn strip_markup(text: &str) -> Result<String, MarkupError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut offset = 0;

    while let Some(pos) = rest.find(['<', '&']) {
        out.push_str(&rest[..pos]);
        let start = offset + pos;
        let tail = &rest[pos..];

        let consumed = if tail.starts_with('<') {
            let end = tail.find('>').ok_or(MarkupError::UnterminatedTag(start))?;
            end + 1
        } else {
            let end = tail.find(';').ok_or(MarkupError::UnterminatedEntity(start))?;
            let name = &tail[1..end];
            let decoded = decode_entity(name).ok_or_else(|| MarkupError::UnknownEntity(name.to_string()))?;
            out.push(decoded);
            end + 1
        };

        rest = &tail[consumed..];
        offset = start + consumed;
    }

    out.push_str(rest);
    Ok(out)
}

/// The text a renderer should actually draw
pub fn visible_text(text: &str, markup: bool) -> String {
    if !markup {
        return text.to_string();
    }

    match strip_markup(text) {
        Ok(plain) => plain,
        Err(e) => {
            log::warn!("invalid markup in '{}' ({}), drawing it as plain text", text, e);
            text.to_string()
        }
    }
}
