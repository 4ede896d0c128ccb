//! Shortlink tokens
//!
//! Converts between full URLs of posts, comments and modmail messages and the
//! compact tokens stored in the `l` field of a usernote:
//!
//! - `l,<post>` for a submission
//! - `l,<post>,<comment>` for a comment
//! - `m,<message>` for a private message
//! - anything else is a full URL stored verbatim (new modmail links)

use crate::error::ToolboxError;
use once_cell::sync::Lazy;
use regex::Regex;

const POST_PREFIX: &str = "l,";
const MESSAGE_PREFIX: &str = "m,";
const MODMAIL_HOST_MARKER: &str = "mod.reddit";

static COMMENTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?i:https?://)?(?i:[a-z]+\.)?(?i:reddit\.com)/(?:r/[A-Za-z0-9_]+/)?comments/([^?#]+)$",
    )
    .expect("valid regex")
});

static SHORTLINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:https?://)?(?i:www\.)?(?i:redd\.it)/([A-Za-z0-9]+)/?$").expect("valid regex")
});

static MESSAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:https?://)?(?i:[a-z]+\.)?(?i:reddit\.com)/message/messages/([A-Za-z0-9]+)/?$")
        .expect("valid regex")
});

/// Link codec bound to one subreddit; comment permalinks are rebuilt under it.
#[derive(Debug, Clone)]
pub struct LinkCodec {
    subreddit: String,
}

impl LinkCodec {
    pub fn new(subreddit: impl Into<String>) -> Self {
        Self {
            subreddit: subreddit.into(),
        }
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    /// Expand a stored token into a URL. An empty token has no URL.
    pub fn expand(&self, token: &str) -> Option<String> {
        // Older writers left a trailing space on comment tokens.
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        if let Some(id) = token.strip_prefix(MESSAGE_PREFIX) {
            return Some(format!("https://www.reddit.com/message/messages/{}", id));
        }

        if let Some(rest) = token.strip_prefix(POST_PREFIX) {
            let mut parts = rest.split(',');
            let post = parts.next().unwrap_or_default();
            return match parts.next() {
                Some(comment) => Some(format!(
                    "https://www.reddit.com/r/{}/comments/{}/-/{}",
                    self.subreddit, post, comment
                )),
                None => Some(format!("https://redd.it/{}", post)),
            };
        }

        Some(token.to_string())
    }

    /// Compress a URL into its stored token.
    pub fn compress(&self, url: &str) -> Result<String, ToolboxError> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(String::new());
        }

        if url.starts_with(POST_PREFIX)
            || url.starts_with(MESSAGE_PREFIX)
            || url.to_ascii_lowercase().contains(MODMAIL_HOST_MARKER)
        {
            return Ok(url.to_string());
        }

        let bare = strip_query(url);

        if let Some(caps) = MESSAGE_RE.captures(bare) {
            return Ok(format!("{}{}", MESSAGE_PREFIX, &caps[1]));
        }

        if let Some(caps) = SHORTLINK_RE.captures(bare) {
            return Ok(format!("{}{}", POST_PREFIX, &caps[1]));
        }

        if let Some(caps) = COMMENTS_RE.captures(bare) {
            let segments: Vec<&str> = caps[1].split('/').filter(|s| !s.is_empty()).collect();
            return match segments.as_slice() {
                [post, _, comment] => Ok(format!("{}{},{}", POST_PREFIX, post, comment)),
                [post, ..] => Ok(format!("{}{}", POST_PREFIX, post)),
                [] => Err(ToolboxError::InvalidLinkFormat(url.to_string())),
            };
        }

        Err(ToolboxError::InvalidLinkFormat(url.to_string()))
    }
}

fn strip_query(url: &str) -> &str {
    match url.find(|c| c == '?' || c == '#') {
        Some(idx) => &url[..idx],
        None => url,
    }
}
