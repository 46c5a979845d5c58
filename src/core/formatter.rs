//! Rendering of arbitrary [`Value`]s into readable text
//!
//! Top-level primitives render bare (`hello`, `42`); nested ones are
//! unambiguous (`'hello'`). Containers render on one line, or one entry per
//! line with two spaces of indent per level in pretty mode. Every container
//! is tracked while it is rendered: meeting it again yields
//! `[Circular refN]`, and the container itself gets a `<refN>` prefix.

use super::error::{LoggerError, Result};
use super::value::{ClassDescriptor, FunctionDescriptor, Value};
use colored::Color;
use std::collections::{HashMap, HashSet};

/// Maximum length of the first source line shown for a function
const FUNCTION_SOURCE_LIMIT: usize = 100;

/// Identity bookkeeping for one formatting call.
///
/// Indices are 1-based and follow the order in which identities were first
/// added. Values passed to [`track`](Self::track) are kept alive until the
/// tracker is dropped, so their addresses cannot be reused by values built
/// later in the same call.
#[derive(Debug, Default)]
pub struct CircularTracker {
    indices: HashMap<usize, usize>,
    circular: HashSet<usize>,
    held: Vec<Value>,
}

impl CircularTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `id`, returning its index.
    ///
    /// Adding an identity twice is a logic error and fails.
    pub fn add(&mut self, id: usize) -> Result<usize> {
        if let Some(index) = self.indices.get(&id) {
            return Err(LoggerError::AlreadyTracked { index: *index });
        }
        let index = self.indices.len() + 1;
        self.indices.insert(id, index);
        Ok(index)
    }

    /// Start tracking a container value, holding on to it.
    pub fn track(&mut self, value: &Value) -> Result<usize> {
        let index = self.add(value.identity().unwrap_or_default())?;
        self.held.push(value.clone());
        Ok(index)
    }

    pub fn has(&self, id: usize) -> bool {
        self.indices.contains_key(&id)
    }

    pub fn index_of(&self, id: usize) -> Option<usize> {
        self.indices.get(&id).copied()
    }

    pub fn is_circular(&self, id: usize) -> bool {
        self.circular.contains(&id)
    }

    pub fn set_as_circular(&mut self, id: usize) {
        self.circular.insert(id);
    }
}

/// Format any value.
///
/// ```
/// use bit_log::{format_any, Value};
///
/// let list = Value::from(vec![1, 2, 3]);
/// assert_eq!(format_any(&list, false, false).unwrap(), "[ 1, 2, 3 ]");
/// assert_eq!(format_any(&list, true, false).unwrap(), "[\n  1,\n  2,\n  3\n]");
/// assert_eq!(format_any(&"plain".into(), false, false).unwrap(), "plain");
/// ```
pub fn format_any(value: &Value, pretty: bool, colored: bool) -> Result<String> {
    let mut tracker = CircularTracker::new();
    ValueFormatter {
        pretty,
        colored,
        tracker: &mut tracker,
    }
    .format(value, 0)
}

/// Wrap `text` in the ANSI code of `color`.
///
/// Colors are applied unconditionally; callers decide whether colored
/// output was requested.
pub fn paint(text: impl std::fmt::Display, color: Color) -> String {
    format!("\x1b[{}m{}\x1b[0m", color.to_fg_str(), text)
}

struct ValueFormatter<'a> {
    pretty: bool,
    colored: bool,
    tracker: &'a mut CircularTracker,
}

impl ValueFormatter<'_> {
    fn format(&mut self, value: &Value, depth: usize) -> Result<String> {
        if depth == 0 {
            match value {
                Value::Undefined => return Ok("undefined".to_string()),
                Value::Null => return Ok("null".to_string()),
                Value::Bool(b) => return Ok(b.to_string()),
                Value::Number(n) => return Ok(number_text(*n)),
                Value::BigInt(n) => return Ok(n.to_string()),
                Value::Str(s) => return Ok(s.clone()),
                _ => {}
            }
        }
        let text = match value {
            Value::Undefined => self.paint("undefined", Color::BrightBlack),
            Value::Null => self.paint("null", Color::BrightWhite),
            Value::Symbol(description) => {
                let description = description.as_deref().unwrap_or_default();
                if self.colored {
                    format!(
                        "{}{}{}",
                        paint("Symbol(", Color::BrightMagenta),
                        description,
                        paint(")", Color::BrightMagenta)
                    )
                } else {
                    format!("Symbol({})", description)
                }
            }
            Value::BigInt(n) => self.paint(n, Color::BrightCyan),
            Value::Number(n) => self.paint(number_text(*n), Color::Cyan),
            Value::Bool(b) => self.paint(b, Color::Yellow),
            Value::Str(s) => self.paint(format!("'{}'", s), Color::Green),
            Value::Array(items) => {
                let snapshot = items.read().clone();
                self.format_list(value, &snapshot, None, depth)?
            }
            Value::Set(items) => {
                let snapshot = items.read().clone();
                self.format_list(value, &snapshot, Some(snapshot.len()), depth)?
            }
            Value::Map(entries) => {
                let snapshot = entries.read().clone();
                let count = snapshot.len();
                self.format_entries(value, snapshot, Some(count), depth)?
            }
            Value::Object(obj) => {
                let entries = obj
                    .describe_fields()
                    .into_iter()
                    .map(|field| (field.name, field.value.into_value()))
                    .collect();
                self.format_entries(value, entries, None, depth)?
            }
            Value::Class(class) => self.format_class(class),
            Value::Function(function) => self.format_function(function),
        };
        Ok(text)
    }

    fn paint(&self, text: impl std::fmt::Display, color: Color) -> String {
        if self.colored {
            paint(text, color)
        } else {
            text.to_string()
        }
    }

    /// Render a member, or a circular marker if its identity is already tracked
    fn format_member(&mut self, member: &Value, depth: usize) -> Result<String> {
        if let Some(id) = member.identity() {
            if let Some(index) = self.tracker.index_of(id) {
                self.tracker.set_as_circular(id);
                return Ok(self.circular_marker(index));
            }
        }
        self.format(member, depth + 1)
    }

    fn circular_marker(&self, index: usize) -> String {
        if self.colored {
            format!(
                "[{} {}]",
                paint("Circular", Color::BrightCyan),
                paint(format!("ref{}", index), Color::BrightBlue)
            )
        } else {
            format!("[Circular ref{}]", index)
        }
    }

    fn ref_prefix(&self, id: usize) -> String {
        match self.tracker.index_of(id) {
            Some(index) if self.tracker.is_circular(id) => {
                self.paint(format!("<ref{}>", index), Color::BrightBlue)
            }
            _ => String::new(),
        }
    }

    fn format_list(
        &mut self,
        container: &Value,
        items: &[Value],
        set_size: Option<usize>,
        depth: usize,
    ) -> Result<String> {
        let id = container.identity().unwrap_or_default();
        self.tracker.track(container)?;
        let results = items
            .iter()
            .map(|item| self.format_member(item, depth))
            .collect::<Result<Vec<_>>>()?;
        let (open, close) = match set_size {
            Some(size) => (format!("Set({}) {{", size), "}"),
            None => ("[".to_string(), "]"),
        };
        Ok(self.wrap(self.ref_prefix(id), &open, close, &results, depth))
    }

    fn format_entries(
        &mut self,
        container: &Value,
        entries: Vec<(String, Value)>,
        map_size: Option<usize>,
        depth: usize,
    ) -> Result<String> {
        let id = container.identity().unwrap_or_default();
        self.tracker.track(container)?;
        let mut results = Vec::with_capacity(entries.len());
        for (key, member) in &entries {
            let rendered = self.format_member(member, depth)?;
            if map_size.is_some() {
                results.push(format!("'{}' => {}", key, rendered));
            } else {
                results.push(format!("{}: {}", key, rendered));
            }
        }
        let open = match map_size {
            Some(size) => format!("Map({}) {{", size),
            None => "{".to_string(),
        };
        Ok(self.wrap(self.ref_prefix(id), &open, "}", &results, depth))
    }

    fn wrap(&self, prefix: String, open: &str, close: &str, results: &[String], depth: usize) -> String {
        if results.is_empty() {
            return format!("{}{}{}", prefix, open, close);
        }
        if self.pretty {
            let indent = " ".repeat((depth + 1) * 2);
            format!(
                "{}{}\n{}{}\n{}{}",
                prefix,
                open,
                indent,
                results.join(&format!(",\n{}", indent)),
                " ".repeat(depth * 2),
                close
            )
        } else {
            format!("{}{} {} {}", prefix, open, results.join(", "), close)
        }
    }

    fn format_class(&self, class: &ClassDescriptor) -> String {
        self.paint(class.hierarchy(), Color::Magenta)
    }

    fn format_function(&self, function: &FunctionDescriptor) -> String {
        let mut lines = function.source.lines();
        let first = lines.next().unwrap_or_default();
        let shown: String = first.chars().take(FUNCTION_SOURCE_LIMIT).collect();
        let ellipsis = if lines.next().is_some() || first.chars().count() > FUNCTION_SOURCE_LIMIT {
            "..."
        } else {
            ""
        };
        format!("[{} {}{}]", self.paint("Function", Color::BrightBlue), shown, ellipsis)
    }
}

fn number_text(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Shorten `text` to `length` characters by replacing its middle with `replacement`.
///
/// When `length` leaves no room for text, the result is `replacement` cut to `length`.
pub fn truncate_middle(text: &str, length: usize, replacement: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= length {
        return text.to_string();
    }
    let replacement: Vec<char> = replacement.chars().collect();
    if replacement.len() >= length {
        return replacement[..length].iter().collect();
    }
    let shown = length - replacement.len();
    let front = shown.div_ceil(2);
    let back = shown / 2;
    let mut result: String = chars[..front].iter().collect();
    result.extend(&replacement);
    result.extend(&chars[chars.len() - back..]);
    result
}

/// Exactly `length` characters: truncated in the middle or padded at the end.
pub fn truncate_or_extend(text: &str, length: usize) -> String {
    format!("{:<width$}", truncate_middle(text, length, "..."), width = length)
}

/// Exactly `length` characters: the tail of `text` behind `...`, or padded at the start.
pub fn truncate_or_extend_left(text: &str, length: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= length {
        return format!("{:>width$}", text, width = length);
    }
    if length < 3 {
        return ".".repeat(length);
    }
    let tail: String = chars[chars.len() - (length - 3)..].iter().collect();
    format!("...{}", tail)
}
