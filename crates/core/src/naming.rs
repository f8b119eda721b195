//! Output filename generation.
//!
//! Names are a pure function of the source filename, the item index and the
//! frozen job settings. The `{date}`/`{time}` values come from the job's
//! [`JobStamp`], so every file in one batch shares them.

use std::path::Path;

use postermill_common::clock::JobStamp;
use postermill_model::{NamingPattern, NamingSpec, OutputFormat};

/// Characters that are replaced by `_` in generated names.
pub const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Widest `{number:0Nd}` directive that is expanded; wider ones stay literal.
pub const MAX_PAD_WIDTH: usize = 32;

/// Build the output filename (with extension) for one batch item.
///
/// `index` is the zero-based position of the file in the job; the number
/// placed in the name is `spec.start_index + index`.
pub fn generate_name(
    original_filename: &str,
    index: usize,
    spec: &NamingSpec,
    format: OutputFormat,
    stamp: &JobStamp,
) -> String {
    let stem = file_stem(original_filename);
    let number = spec.start_index as u64 + index as u64;
    let width = spec.pad_width.min(MAX_PAD_WIDTH);

    let name = match &spec.pattern {
        NamingPattern::Original => stem.to_string(),
        NamingPattern::Number => number.to_string(),
        NamingPattern::PaddedNumber => format!("{number:0width$}"),
        NamingPattern::PrefixOriginal => format!("{}{stem}", spec.prefix),
        NamingPattern::OriginalSuffix => format!("{stem}{}", spec.suffix),
        NamingPattern::PrefixPaddedNumber => format!("{}{number:0width$}", spec.prefix),
        NamingPattern::Custom(template) => {
            let fields = TemplateFields {
                original: stem,
                number,
                prefix: &spec.prefix,
                suffix: &spec.suffix,
                date: stamp.date(),
                time: stamp.time(),
            };
            expand_padding(&fields.substitute(template), number)
        }
    };

    format!("{}{}", sanitize(&name), format.extension())
}

/// Replace every character in [`ILLEGAL_CHARS`] with `_`.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Filename without its final extension. Dotfiles keep their name.
fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

struct TemplateFields<'a> {
    original: &'a str,
    number: u64,
    prefix: &'a str,
    suffix: &'a str,
    date: &'a str,
    time: &'a str,
}

impl TemplateFields<'_> {
    fn lookup(&self, key: &str) -> Option<String> {
        Some(match key {
            "original" => self.original.to_string(),
            "number" => self.number.to_string(),
            "prefix" => self.prefix.to_string(),
            "suffix" => self.suffix.to_string(),
            "date" => self.date.to_string(),
            "time" => self.time.to_string(),
            _ => return None,
        })
    }

    /// One left-to-right pass over `{key}` placeholders. Substituted text is
    /// not scanned again; unknown keys (padding directives included) are kept.
    fn substitute(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len() + 16);
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            let Some(close) = tail.find('}') else {
                out.push_str(tail);
                return out;
            };

            let key = &tail[1..close];
            match self.lookup(key) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&tail[..=close]),
            }
            rest = &tail[close + 1..];
        }

        out.push_str(rest);
        out
    }
}

/// Final pass: expand every `{number:Nd}` / `{number:0Nd}` directive.
fn expand_padding(text: &str, number: u64) -> String {
    const OPEN: &str = "{number:";

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(OPEN) {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + OPEN.len()..];

        match padding_directive(after) {
            Some((width, consumed)) => {
                out.push_str(&format!("{number:0width$}"));
                rest = &after[consumed..];
            }
            None => {
                out.push_str(OPEN);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Parse `Nd}` at the start of `s`, returning the width and bytes consumed.
fn padding_directive(s: &str) -> Option<(usize, usize)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || !s[digits..].starts_with("d}") {
        return None;
    }
    let width: usize = s[..digits].parse().ok()?;
    (width <= MAX_PAD_WIDTH).then_some((width, digits + 2))
}
