use bsim_core::{
    messaging::{port::MessagingPort, types::IncomingText},
    replies::{reply_for_text, EntryReply},
    Result,
};

/// Parse the message, reply with the recognised entries (or guidance) and
/// return what was sent.
pub async fn handle_text(
    incoming: &IncomingText,
    messenger: &dyn MessagingPort,
    mini_app_url: &str,
) -> Result<EntryReply> {
    let reply = reply_for_text(&incoming.text, mini_app_url);
    tracing::info!(
        chat_id = incoming.chat_id.0,
        language = reply.language.code(),
        entries = reply.entries.len(),
        "bot text message"
    );

    let limit = messenger.capabilities().max_message_len;
    for part in split_on_lines(&reply.html, limit) {
        messenger.send_html(incoming.chat_id, &part).await?;
    }
    Ok(reply)
}

/// Split `text` into pieces of at most `limit` chars, breaking between lines
/// where possible.
fn split_on_lines(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    let mut started = false;

    for line in text.split('\n') {
        let line_len = line.chars().count();

        if started && current_len + 1 + line_len > limit {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
            started = false;
        }

        if line_len > limit {
            parts.extend(wrap_line(line, limit));
            continue;
        }

        if started {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
        started = true;
    }

    if started {
        parts.push(current);
    }
    parts
}

/// Hard-wrap one oversized line. HTML entities and tags are never cut; one
/// that is itself longer than `limit` gets a piece of its own.
fn wrap_line(line: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_len = 0usize;
    let mut rest = line;

    while let Some(c) = rest.chars().next() {
        let atom_end = match c {
            '&' => rest
                .find(';')
                .filter(|&end| {
                    end > 1 && rest[1..end].chars().all(|c| c.is_ascii_alphanumeric() || c == '#')
                })
                .map_or(1, |end| end + 1),
            '<' => rest.find('>').map_or(1, |end| end + 1),
            _ => c.len_utf8(),
        };
        let (atom, tail) = rest.split_at(atom_end);
        let atom_len = atom.chars().count();

        if piece_len > 0 && piece_len + atom_len > limit {
            pieces.push(std::mem::take(&mut piece));
            piece_len = 0;
        }
        piece.push_str(atom);
        piece_len += atom_len;
        rest = tail;
    }

    if piece_len > 0 {
        pieces.push(piece);
    }
    pieces
}
