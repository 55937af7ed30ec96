//! Localized bot replies for free-text budget messages.

use crate::{
    domain::{Language, ParsedEntry},
    entries::parse_entries,
    formatting::{escape_html, group_thousands},
    language::detect_language,
};

/// Reply produced for one inbound chat message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryReply {
    pub language: Language,
    pub entries: Vec<ParsedEntry>,
    /// Telegram HTML.
    pub html: String,
}

/// Detect the message locale, extract entries and render the reply text.
pub fn reply_for_text(text: &str, mini_app_url: &str) -> EntryReply {
    let language = detect_language(text);
    let entries = parse_entries(text);
    let html = if entries.is_empty() {
        render_guidance(language, mini_app_url)
    } else {
        render_entries(language, &entries)
    };
    EntryReply {
        language,
        entries,
        html,
    }
}

pub fn render_entries(language: Language, entries: &[ParsedEntry]) -> String {
    let (header, total_label) = match language {
        Language::En => ("✅ Recorded entries", "Total"),
        Language::Ru => ("✅ Записано", "Итого"),
        Language::Uz => ("✅ Yozib olindi", "Jami"),
    };

    let mut out = format!("<b>{header}</b> ({})\n", entries.len());
    for entry in entries {
        out.push_str(&format!(
            "• {} — {}\n",
            escape_html(&entry.label),
            group_thousands(entry.amount)
        ));
    }

    let total = entries
        .iter()
        .fold(0u64, |acc, e| acc.saturating_add(e.amount));
    out.push_str(&format!("\n<b>{total_label}:</b> {}", group_thousands(total)));
    out
}

pub fn render_guidance(language: Language, mini_app_url: &str) -> String {
    let body = match language {
        Language::En => {
            "💬 I couldn't find any entries in your message.\n\n\
             Send one entry per line, for example:\n<code>Coffee 50000</code>\n<code>Taxi - 30 000</code>\n\n\
             For tracking, advice and progress open the simulator:"
        }
        Language::Ru => {
            "💬 Не удалось найти записи в сообщении.\n\n\
             Отправьте по одной записи в строке, например:\n<code>Кофе 50000</code>\n<code>Такси - 30 000</code>\n\n\
             Для учёта, советов и прогресса откройте симулятор:"
        }
        Language::Uz => {
            "💬 Xabaringizda yozuvlar topilmadi.\n\n\
             Har bir qatorga bitta yozuv yuboring, masalan:\n<code>Kofe 50000</code>\n<code>Taksi - 30 000</code>\n\n\
             Hisob, maslahat va natijalar uchun simulyatorni oching:"
        }
    };
    format!("{body}\n{}", escape_html(mini_app_url))
}
