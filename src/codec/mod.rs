//! Conversion between gallery prompts and GitHub issue payloads.
//!
//! An issue body stores a prompt as a delimited metadata header followed by a
//! fixed heading and the prompt text in a fenced block:
//!
//! ````text
//! ---
//! model: flux
//! category: 风景
//! image_url: https://example.com/a.png
//! tags: orange,calm
//! created_at: 2024-05-01
//! author: octocat
//! ---
//!
//! ## 完整提示词
//!
//! ```
//! a sunset over mountains
//! ```
//! ````

pub mod header;
pub mod models;

pub use header::Header;
pub use models::{
    AiModel, EncodedIssue, NewPrompt, Prompt, RawIssue, AI_MODELS, DEFAULT_CATEGORIES,
    FALLBACK_CATEGORY,
};

use chrono::{NaiveDate, Utc};
use thiserror::Error;

/// Marker prepended to issue titles.
pub const TITLE_MARKER: &str = "🖼️";

/// Heading that introduces the prompt text.
pub const PROMPT_HEADING: &str = "完整提示词";

/// Label every gallery issue carries.
pub const PROMPT_LABEL: &str = "prompt";

/// Shortest fence that opens a code block.
const MIN_FENCE: usize = 3;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("issue {} is malformed: {source}", issue_label(.number))]
    Malformed {
        number: Option<u64>,
        source: serde_json::Error,
    },
}

fn issue_label(number: &Option<u64>) -> String {
    match number {
        Some(n) => format!("#{n}"),
        None => "<unknown>".to_string(),
    }
}

/// Result of decoding a page of issues. Failures are kept so callers can log them.
#[derive(Debug, Default)]
pub struct Decoded {
    pub prompts: Vec<Prompt>,
    pub failures: Vec<DecodeError>,
}

/// Encode a new prompt, stamped with today's UTC date.
pub fn encode(prompt: &NewPrompt, owner: &str) -> EncodedIssue {
    encode_at(prompt, owner, Utc::now().date_naive())
}

/// Encode a new prompt as an issue title, body and label set.
///
/// `author` is always the repository owner, not whoever is logged in.
/// Line breaks in single-line fields are folded into spaces so they cannot
/// add header lines.
pub fn encode_at(prompt: &NewPrompt, owner: &str, today: NaiveDate) -> EncodedIssue {
    let model = single_line(prompt.model.as_str());
    let category = single_line(&prompt.category);
    let title = format!("{TITLE_MARKER} {} | {model}", single_line(&prompt.title));
    let tags: Vec<String> = prompt.tags.iter().map(|t| single_line(t)).collect();
    let fence = fence_for(&prompt.prompt);

    let body = format!(
        "{delim}\n\
         model: {model}\n\
         category: {category}\n\
         image_url: {image_url}\n\
         tags: {tags}\n\
         created_at: {created_at}\n\
         author: {owner}\n\
         {delim}\n\
         \n\
         ## {PROMPT_HEADING}\n\
         \n\
         {fence}\n\
         {text}\n\
         {fence}\n",
        delim = header::DELIMITER,
        image_url = single_line(prompt.image_url.as_deref().unwrap_or("")),
        tags = tags.join(","),
        created_at = today.format("%Y-%m-%d"),
        text = prompt.prompt,
    );

    let labels = vec![
        PROMPT_LABEL.to_string(),
        format!("model:{model}"),
        format!("category:{category}"),
    ];

    EncodedIssue { title, body, labels }
}

fn single_line(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A backtick fence longer than any fence line inside `text`.
fn fence_for(text: &str) -> String {
    let longest = text
        .lines()
        .map(|line| backtick_run(line.trim_start()))
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(MIN_FENCE - 1) + 1)
}

fn backtick_run(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b'`').count()
}

/// A line closes a fence of length `open` when it holds only a backtick run
/// at least that long.
fn closes_fence(line: &str, open: usize) -> bool {
    let line = line.trim();
    let run = backtick_run(line);
    run >= open && line[run..].trim().is_empty()
}

/// Decode one issue. Missing metadata falls back to defaults:
///
/// | key          | fallback                    |
/// |--------------|-----------------------------|
/// | `model`      | first of [`AI_MODELS`]      |
/// | `category`   | [`FALLBACK_CATEGORY`]       |
/// | `image_url`  | none                        |
/// | `tags`       | empty                       |
/// | `created_at` | the issue's `created_at`    |
/// | `author`     | `owner`                     |
pub fn decode(issue: &RawIssue, owner: &str) -> Prompt {
    let body = issue.body.as_deref().unwrap_or("");
    let (header, rest) = Header::parse(body);

    let tags = header
        .get("tags")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Prompt {
        id: issue.id.to_string(),
        number: issue.number,
        title: clean_title(&issue.title),
        model: header.get("model").map(AiModel::parse).unwrap_or_default(),
        category: header
            .get("category")
            .unwrap_or(FALLBACK_CATEGORY)
            .to_string(),
        prompt: extract_prompt(rest),
        image_url: header.get("image_url").map(str::to_string),
        tags,
        created_at: header
            .get("created_at")
            .unwrap_or(issue.created_at.as_str())
            .to_string(),
        author: header.get("author").unwrap_or(owner).to_string(),
    }
}

/// Decode one element of an issue listing.
pub fn decode_issue(value: serde_json::Value, owner: &str) -> Result<Prompt, DecodeError> {
    let number = value.get("number").and_then(serde_json::Value::as_u64);
    let issue: RawIssue =
        serde_json::from_value(value).map_err(|source| DecodeError::Malformed { number, source })?;
    Ok(decode(&issue, owner))
}

/// Decode a page of issues. A bad element never stops the rest.
pub fn decode_batch(values: Vec<serde_json::Value>, owner: &str) -> Decoded {
    let mut decoded = Decoded::default();
    for value in values {
        match decode_issue(value, owner) {
            Ok(prompt) => decoded.prompts.push(prompt),
            Err(e) => decoded.failures.push(e),
        }
    }
    decoded
}

/// Strip the title marker and the `| model` suffix.
pub fn clean_title(title: &str) -> String {
    let title = title.trim_start();
    let title = title
        .strip_prefix(TITLE_MARKER)
        .or_else(|| title.strip_prefix('\u{1F5BC}'))
        .unwrap_or(title);
    title.split('|').next().unwrap_or("").trim().to_string()
}

/// Text under the prompt heading, up to the next heading, without its fence.
fn extract_prompt(text: &str) -> String {
    let mut lines = text.lines();

    let found = lines.by_ref().any(|line| {
        line.trim_start()
            .strip_prefix("##")
            .is_some_and(|h| h.trim() == PROMPT_HEADING)
    });
    if !found {
        return String::new();
    }

    let mut section = Vec::new();
    let mut fence: Option<usize> = None;
    for line in lines {
        let trimmed = line.trim_start();
        match fence {
            Some(open) => {
                if closes_fence(trimmed, open) {
                    fence = None;
                }
            }
            None => {
                let run = backtick_run(trimmed);
                if run >= MIN_FENCE {
                    fence = Some(run);
                } else if trimmed.starts_with('#') {
                    break;
                }
            }
        }
        section.push(line);
    }

    unfence(section.join("\n").trim()).to_string()
}

fn unfence(section: &str) -> &str {
    let open = backtick_run(section);
    if open < MIN_FENCE {
        return section;
    }
    // The rest of the opening fence line is an info string, if anything.
    let Some((_, rest)) = section.split_once('\n') else {
        return section;
    };
    let (body, last) = rest.rsplit_once('\n').unwrap_or(("", rest));
    if closes_fence(last, open) {
        body.trim()
    } else {
        section
    }
}
