//! Multipart form-data encoding of nested drafts.
//!
//! A draft is described as a [`FormValue`] tree and flattened into an ordered
//! list of `(key, part)` entries using bracket notation (`title[uz]`,
//! `items[0][name]`), which a structurally-aware receiver can rebuild into
//! the original nesting.
//!
//! # Absent values
//!
//! An `Absent` value produces no entry when it is the root or a sequence
//! element, but produces an empty string when it is a mapping child. So
//! `{a: {b: "x", c: absent}}` encodes to `a[b]=x` and `a[c]=` while a bare
//! `absent` encodes to nothing.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};
use std::fmt;

use crate::image::LocalFile;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(x) if x.is_infinite() => {
                f.write_str(if *x > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// An encodable value.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Absent,
    Scalar(Scalar),
    Binary(LocalFile),
    Timestamp(DateTime<Utc>),
    Sequence(Vec<FormValue>),
    /// Keys in insertion order
    Mapping(Vec<(String, FormValue)>),
}

impl FormValue {
    pub fn text(value: &str) -> Self {
        FormValue::Scalar(Scalar::Text(value.to_string()))
    }

    pub fn integer(value: i64) -> Self {
        FormValue::Scalar(Scalar::Integer(value))
    }

    pub fn bool(value: bool) -> Self {
        FormValue::Scalar(Scalar::Bool(value))
    }

    pub fn mapping(entries: Vec<(&str, FormValue)>) -> Self {
        FormValue::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    /// Append a key to a mapping; no-op for every other variant.
    pub fn insert(&mut self, key: &str, value: FormValue) {
        if let FormValue::Mapping(entries) = self {
            entries.push((key.to_string(), value));
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text(String),
    File(LocalFile),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormEntry {
    pub key: String,
    pub part: FormPart,
}

/// Flat, ordered transmission payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    entries: Vec<FormEntry>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_text(&mut self, key: &str, value: String) {
        self.entries.push(FormEntry {
            key: key.to_string(),
            part: FormPart::Text(value),
        });
    }

    pub fn append_file(&mut self, key: &str, file: LocalFile) {
        self.entries.push(FormEntry {
            key: key.to_string(),
            part: FormPart::File(file),
        });
    }

    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// First text value under `key`.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.entries.iter().find_map(|e| match &e.part {
            FormPart::Text(s) if e.key == key => Some(s.as_str()),
            _ => None,
        })
    }

    /// First file under `key`.
    pub fn get_file(&self, key: &str) -> Option<&LocalFile> {
        self.entries.iter().find_map(|e| match &e.part {
            FormPart::File(f) if e.key == key => Some(f),
            _ => None,
        })
    }

    /// Build the multipart body; file parts keep their name and MIME type.
    pub fn into_multipart(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for entry in self.entries {
            form = match entry.part {
                FormPart::Text(value) => form.text(entry.key, value),
                FormPart::File(file) => {
                    let part = Part::bytes(file.bytes)
                        .file_name(file.file_name)
                        .mime_str(&file.mime_type)?;
                    form.part(entry.key, part)
                }
            };
        }
        Ok(form)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn child_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}[{}]", prefix, key)
    }
}

/// Encode a value into a fresh payload.
pub fn encode(value: &FormValue) -> FormPayload {
    let mut payload = FormPayload::new();
    encode_into(value, &mut payload, "");
    payload
}

/// Encode a value into an existing payload under `prefix`.
pub fn encode_into(value: &FormValue, payload: &mut FormPayload, prefix: &str) {
    match value {
        FormValue::Absent => {}
        FormValue::Binary(file) => payload.append_file(prefix, file.clone()),
        FormValue::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                encode_into(item, payload, &format!("{}[{}]", prefix, i));
            }
        }
        FormValue::Mapping(entries) => {
            for (key, child) in entries {
                let form_key = child_key(prefix, key);
                match child {
                    FormValue::Binary(file) => payload.append_file(&form_key, file.clone()),
                    FormValue::Sequence(_) | FormValue::Mapping(_) => {
                        encode_into(child, payload, &form_key)
                    }
                    // Absent survives as "" once inside a mapping
                    FormValue::Absent => payload.append_text(&form_key, String::new()),
                    FormValue::Timestamp(ts) => payload.append_text(&form_key, format_timestamp(ts)),
                    FormValue::Scalar(s) => payload.append_text(&form_key, s.to_string()),
                }
            }
        }
        FormValue::Timestamp(ts) => payload.append_text(prefix, format_timestamp(ts)),
        FormValue::Scalar(s) => payload.append_text(prefix, s.to_string()),
    }
}
