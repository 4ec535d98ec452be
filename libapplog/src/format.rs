/*
 * Console line templates
 *
 * A template is plain text with {field} placeholders. A placeholder may carry an alignment
 * such as {name:>10}, {message:<20} or {levelname:^8}. Doubled braces ({{, }}) produce
 * literal braces. Known fields:
 * - asctime: the record timestamp rendered with the time format
 * - name: the logger name
 * - levelname / levelno: the severity as text or number
 * - message: the log message
 * - extra: the structured context as compact JSON
 * - error: "Type: message" of the error passed to exception
 *
 * Any other field name is looked up in the record's extras and renders empty when absent.
 */

use std::fmt::Write;

use serde_json::Value;

use crate::config::{validate_time_format, DEFAULT_TIME_FORMAT};
use crate::error::LogError;
use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        name: String,
        pad: Option<(Align, usize)>,
    },
}

/// A parsed console template together with its timestamp format
#[derive(Debug, Clone)]
pub struct Formatter {
    segments: Vec<Segment>,
    time_format: String,
}

impl Formatter {
    pub fn parse(template: &str, time_format: &str) -> Result<Self, LogError> {
        validate_time_format(time_format)?;

        let invalid = |reason: &str| LogError::InvalidFormat {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(invalid("unmatched '}'")),
                '{' => {
                    let mut body = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') => return Err(invalid("nested '{' inside placeholder")),
                            Some(ch) => body.push(ch),
                            None => return Err(invalid("unclosed placeholder")),
                        }
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(parse_field(&body).map_err(|reason| invalid(&reason))?);
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Formatter {
            segments,
            time_format: time_format.to_string(),
        })
    }

    /// True when the template renders the error summary itself
    pub fn shows_error(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Field { name, .. } if name == "error"))
    }

    pub fn format(&self, record: &Record<'_>) -> String {
        let mut line = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Field { name, pad } => {
                    let value = self.field_value(name, record);
                    match pad {
                        Some((align, width)) => push_padded(&mut line, &value, *align, *width),
                        None => line.push_str(&value),
                    }
                }
            }
        }
        line
    }

    fn field_value(&self, name: &str, record: &Record<'_>) -> String {
        match name {
            "asctime" => self.timestamp(record),
            "name" => record.logger.to_string(),
            "levelname" => record.level.as_str().to_string(),
            "levelno" => record.level.as_number().to_string(),
            "message" => record.message.to_string(),
            "extra" => record
                .extra
                .map(|extra| Value::Object(extra.clone()).to_string())
                .unwrap_or_default(),
            "error" => record.error.map(|e| e.to_string()).unwrap_or_default(),
            key => match record.extra.and_then(|extra| extra.get(key)) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            },
        }
    }

    fn timestamp(&self, record: &Record<'_>) -> String {
        let mut rendered = String::new();
        if write!(rendered, "{}", record.timestamp.format(&self.time_format)).is_err() {
            rendered.clear();
            let _ = write!(rendered, "{}", record.timestamp.format(DEFAULT_TIME_FORMAT));
        }
        rendered
    }
}

fn parse_field(body: &str) -> Result<Segment, String> {
    let (name, spec) = match body.split_once(':') {
        Some((name, spec)) => (name, Some(spec)),
        None => (body, None),
    };
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("invalid placeholder name '{}'", name));
    }

    let pad = match spec {
        None => None,
        Some(spec) => {
            let (align, width) = match spec.chars().next() {
                Some('<') => (Align::Left, &spec[1..]),
                Some('>') => (Align::Right, &spec[1..]),
                Some('^') => (Align::Center, &spec[1..]),
                _ => (Align::Left, spec),
            };
            let width = width
                .parse::<usize>()
                .map_err(|_| format!("invalid width in '{{{}}}'", body))?;
            Some((align, width))
        }
    };

    Ok(Segment::Field {
        name: name.to_string(),
        pad,
    })
}

fn push_padded(line: &mut String, value: &str, align: Align, width: usize) {
    let len = value.chars().count();
    let fill = width.saturating_sub(len);
    let (before, after) = match align {
        Align::Left => (0, fill),
        Align::Right => (fill, 0),
        Align::Center => (fill / 2, fill - fill / 2),
    };
    line.extend(std::iter::repeat(' ').take(before));
    line.push_str(value);
    line.extend(std::iter::repeat(' ').take(after));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Level, DEFAULT_CONSOLE_FORMAT};
    use crate::record::Extra;
    use chrono::{Local, TimeZone};
    use serde_json::json;

    fn record<'a>(message: &'a str, extra: Option<&'a Extra>) -> Record<'a> {
        let mut record = Record::new("api", Level::Warning, message).with_extra(extra);
        record.timestamp = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        record
    }

    #[test]
    fn default_template_pads_like_the_classic_layout() {
        let formatter = Formatter::parse(DEFAULT_CONSOLE_FORMAT, DEFAULT_TIME_FORMAT).unwrap();
        let line = formatter.format(&record("hi", None));
        assert_eq!(line, "2024-03-01T12:30:05        api    WARNING:         hi");
    }

    #[test]
    fn renders_extra_and_extra_keys() {
        let extra = json!({"foo": "bar", "n": 3}).as_object().unwrap().clone();
        let formatter = Formatter::parse("{message} {foo} {n} {missing}|{extra}", "%T").unwrap();
        let line = formatter.format(&record("bar", Some(&extra)));
        assert_eq!(line, r#"bar bar 3 |{"foo":"bar","n":3}"#);
    }

    #[test]
    fn escapes_and_alignment() {
        let formatter = Formatter::parse("{{{levelname:^9}}} {levelno:<4}|", "%T").unwrap();
        assert_eq!(formatter.format(&record("x", None)), "{ WARNING } 30  |");
    }

    #[test]
    fn rejects_malformed_templates() {
        for template in ["{message", "message}", "{}", "{name:>x}", "{a{b}}"] {
            assert!(
                matches!(Formatter::parse(template, "%T"), Err(LogError::InvalidFormat { .. })),
                "accepted {}",
                template
            );
        }
    }

    #[test]
    fn rejects_time_formats_that_cannot_render() {
        assert!(matches!(
            Formatter::parse("{asctime}", "%#z"),
            Err(LogError::InvalidTimeFormat(_))
        ));
    }

    #[test]
    fn unrenderable_time_format_falls_back_to_default() {
        let formatter = Formatter {
            segments: vec![Segment::Field {
                name: "asctime".into(),
                pad: None,
            }],
            time_format: "%#z".into(),
        };
        assert_eq!(formatter.format(&record("x", None)), "2024-03-01T12:30:05");
    }

    #[test]
    fn detects_error_placeholder() {
        assert!(Formatter::parse("{message} {error}", "%T").unwrap().shows_error());
        assert!(!Formatter::parse(DEFAULT_CONSOLE_FORMAT, "%T").unwrap().shows_error());
    }
}
