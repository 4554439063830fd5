//! Cleanup rules turning raw model output into a commit message candidate.
//!
//! Each rule is a plain `&str -> String` function so it can be tested on its
//! own. [`normalize`] runs [`PIPELINE`] in order, repeating it until the text
//! stops changing.
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// A single named cleanup rule
pub type Transform = fn(&str) -> String;

/// Rules in application order. Order matters: quotes must go before the
/// preamble check, a chatty first line ("Sure!") must be gone before the
/// first line is taken, and the prefix rules need the preamble removed.
pub const PIPELINE: &[(&str, Transform)] = &[
   ("normalize_unicode", normalize_unicode),
   ("strip_wrapping_quotes", strip_wrapping_quotes),
   ("strip_preamble", strip_preamble),
   ("take_first_line", take_first_line),
   ("strip_trailing_period", strip_trailing_period),
   ("strip_trailing_parenthetical", strip_trailing_parenthetical),
   ("lowercase_prefix", lowercase_prefix),
   ("hyphenate_scope", hyphenate_scope),
   ("trim_whitespace", trim_whitespace),
];

const QUOTE_CHARS: [char; 3] = ['"', '\'', '`'];

/// `type(scope):` at the very start of the text
static PREFIX_RE: LazyLock<Regex> =
   LazyLock::new(|| Regex::new(r"^([A-Za-z]+)\(([^()]*)\):").expect("prefix pattern is valid"));

/// Acknowledgements models put in front of an answer ("Sure! ...")
static ACK_RE: LazyLock<Regex> = LazyLock::new(|| {
   Regex::new(r"(?i)^(?:sure|okay|ok|certainly|absolutely)\b[!,.]*\s*")
      .expect("acknowledgement pattern is valid")
});

/// Conversational lead-ins ("Here is the commit message:", "I suggest ...")
static PREAMBLE_RE: LazyLock<Regex> = LazyLock::new(|| {
   Regex::new(
      r"(?ix)^(?:
         here(?:'s|\s+is)(?:\s+[a-z-]+){0,6}?\s*:
         | here(?:'s|\s+is)\s+
         | i\s+(?:would\s+)?suggest(?:\s+the\s+following)?(?:\s+commit)?(?:\s+message)?\s*:?
         | suggested(?:\s+commit)?(?:\s+message)?\s*:
         | (?:the\s+)?commit(?:\s+message)?\s*:
      )\s*",
   )
   .expect("preamble pattern is valid")
});

static TRAILING_PAREN_RE: LazyLock<Regex> = LazyLock::new(|| {
   Regex::new(r"\s*\([^()]*\)\s*$").expect("trailing parenthetical pattern is valid")
});

/// Normalize Unicode characters to ASCII (remove AI-style formatting)
pub fn normalize_unicode(text: &str) -> String {
   let normalized: String = text.nfkd().collect();

   normalized
      // Smart quotes to straight quotes
      .replace(['\u{2018}', '\u{2019}', '\u{201A}', '\u{2039}', '\u{203A}'], "'")
      .replace(['\u{201C}', '\u{201D}', '\u{201E}', '\u{00AB}', '\u{00BB}'], "\"")
      // Dashes and hyphens
      .replace(['\u{2010}', '\u{2011}', '\u{2012}', '\u{2212}'], "-")
      .replace(['\u{2013}', '\u{2014}', '\u{2015}'], "--")
      .replace('\u{2026}', "...")
      // Special spaces to regular space
      .replace(
         [
            '\u{00A0}', '\u{2000}', '\u{2001}', '\u{2002}', '\u{2003}', '\u{2004}', '\u{2005}',
            '\u{2006}', '\u{2007}', '\u{2008}', '\u{2009}', '\u{200A}', '\u{202F}', '\u{205F}',
            '\u{3000}',
         ],
         " ",
      )
      // Zero-width characters (remove)
      .replace(['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'], "")
}

/// Keep only the first non-blank line
pub fn take_first_line(text: &str) -> String {
   text
      .lines()
      .map(str::trim)
      .find(|line| !line.is_empty())
      .unwrap_or_default()
      .to_string()
}

/// Remove quote characters wrapping the whole text (`"..."`, `'...'`,
/// `` `...` ``), including nested pairs such as markdown code fences
pub fn strip_wrapping_quotes(text: &str) -> String {
   let mut current = text.trim();
   loop {
      let mut chars = current.chars();
      match (chars.next(), chars.next_back()) {
         (Some(first), Some(last)) if first == last && QUOTE_CHARS.contains(&first) => {
            current = current[1..current.len() - 1].trim();
         },
         _ => return current.to_string(),
      }
   }
}

/// Remove conversational lead-ins, case-insensitively
pub fn strip_preamble(text: &str) -> String {
   let mut current = text.trim_start().to_string();
   loop {
      let before = current.len();
      current = ACK_RE.replace(&current, "").into_owned();
      current = PREAMBLE_RE.replace(&current, "").into_owned();
      if current.len() == before {
         return current;
      }
   }
}

/// Remove trailing periods (conventional commit subjects have none)
pub fn strip_trailing_period(text: &str) -> String {
   text.trim_end().trim_end_matches('.').to_string()
}

/// Remove a parenthetical remark appended after the description, e.g.
/// `feat(ui): add dark mode (closes #12)`. The scope is never touched.
pub fn strip_trailing_parenthetical(text: &str) -> String {
   let Some(prefix) = PREFIX_RE.find(text) else {
      return text.to_string();
   };
   let (head, description) = text.split_at(prefix.end());
   format!("{head}{}", TRAILING_PAREN_RE.replace(description, ""))
}

/// Lowercase the `type(scope)` prefix when it contains upper-case letters
pub fn lowercase_prefix(text: &str) -> String {
   let Some(prefix) = PREFIX_RE.find(text) else {
      return text.to_string();
   };
   let (head, rest) = text.split_at(prefix.end());
   if head.chars().any(char::is_uppercase) {
      format!("{}{rest}", head.to_lowercase())
   } else {
      text.to_string()
   }
}

/// Turn `/` inside the scope into `-` (`api/client` becomes `api-client`)
pub fn hyphenate_scope(text: &str) -> String {
   let Some(caps) = PREFIX_RE.captures(text) else {
      return text.to_string();
   };
   let scope = &caps[2];
   if !scope.contains('/') {
      return text.to_string();
   }
   let end = caps.get(0).map_or(0, |m| m.end());
   format!("{}({}):{}", &caps[1], scope.replace('/', "-"), &text[end..])
}

pub fn trim_whitespace(text: &str) -> String {
   text.trim().to_string()
}

/// Run every rule of [`PIPELINE`] once, in order
pub fn apply_pipeline(text: &str) -> String {
   PIPELINE.iter().fold(text.to_string(), |current, (name, transform)| {
      let next = transform(&current);
      if next != current {
         tracing::debug!(rule = name, before = %current, after = %next, "normalization rule applied");
      }
      next
   })
}

/// Clean raw model output into a commit message candidate.
///
/// The pipeline is repeated until a pass changes nothing, which makes the
/// result idempotent even when one rule uncovers work for an earlier one
/// (a quoted message behind a preamble, a period before a parenthetical).
pub fn normalize(raw: &str) -> String {
   let max_passes = raw.len() * 4 + 8;
   let mut current = apply_pipeline(raw);
   for _ in 0..max_passes {
      let next = apply_pipeline(&current);
      if next == current {
         break;
      }
      current = next;
   }
   current
}
