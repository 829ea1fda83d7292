//! Per-endpoint parameter schemas.
//!
//! # Design
//! A `Schema` only answers "is this key accepted, and with which kind". The
//! rules that turn a value into query text live in `query` and are keyed by
//! parameter name, so a schema may declare a key that the builder still
//! refuses with `UnhandledParameter`.

use crate::error::ApiError;
use crate::params::{ParamKind, Parameters};

/// Fixed table of accepted parameter names and their kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    entries: &'static [(&'static str, ParamKind)],
}

impl Schema {
    pub const fn new(entries: &'static [(&'static str, ParamKind)]) -> Self {
        Self { entries }
    }

    /// Declared kind for `key`, if the key is accepted.
    pub fn kind_of(&self, key: &str) -> Option<ParamKind> {
        self.entries
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, kind)| *kind)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(name, _)| *name)
    }

    /// Check that every key is known and every value has the declared kind.
    pub fn verify(&self, params: &Parameters) -> Result<(), ApiError> {
        for (key, value) in params.iter() {
            let expected = self
                .kind_of(key)
                .ok_or_else(|| ApiError::UnknownParameter(key.to_string()))?;
            let actual = value.kind();
            if actual != expected {
                return Err(ApiError::TypeMismatch {
                    key: key.to_string(),
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

pub const TOP_HEADLINES: Schema = Schema::new(&[
    ("country", ParamKind::Text),
    ("category", ParamKind::Text),
    ("sources", ParamKind::TextList),
    ("q", ParamKind::Text),
    ("pageSize", ParamKind::Integer),
    ("page", ParamKind::Integer),
]);

pub const EVERYTHING: Schema = Schema::new(&[
    ("q", ParamKind::Text),
    ("sources", ParamKind::TextList),
    ("domains", ParamKind::TextList),
    ("from", ParamKind::Text),
    ("to", ParamKind::Text),
    ("language", ParamKind::Text),
    ("sortBy", ParamKind::Text),
    ("pageSize", ParamKind::Integer),
    ("page", ParamKind::Integer),
]);

pub const SOURCES: Schema = Schema::new(&[
    ("country", ParamKind::Text),
    ("category", ParamKind::Text),
    ("language", ParamKind::Text),
]);
