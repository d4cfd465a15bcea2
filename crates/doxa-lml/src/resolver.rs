/*
 * resolver.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Reference resolution.
//!
//! Validates the topic/key path of a `nid`, `rid`, or `sid`, applies
//! calendar-relative rewriting to `rid` topics, and checks that the result
//! exists in the topic-key index. Every problem is reported as a message;
//! only an index failure is returned as an error.

use doxa_calendar::{LiturgicalDay, is_octoechos_topic};
use tracing::trace;

use crate::error::IndexError;
use crate::index::TopicKeyIndex;
use crate::model::Reference;

/// Kind of reference being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Nid,
    Rid,
    Sid,
}

/// `@Mode` and `@Day` values as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Overrides {
    pub mode: Option<i64>,
    pub day: Option<i64>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.mode.is_none() && self.day.is_none()
    }
}

/// Part of a reference a problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    /// The path or literal text.
    Reference,
    /// The `@Mode` override.
    Mode,
    /// The `@Day` override.
    Day,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub subject: Subject,
    pub text: String,
}

impl Message {
    fn reference(text: impl Into<String>) -> Self {
        Self {
            subject: Subject::Reference,
            text: text.into(),
        }
    }
}

/// Outcome of resolving one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The reference to place in the document.
    pub reference: Reference,
    /// Problems found; empty when the reference is valid.
    pub messages: Vec<Message>,
}

impl Resolved {
    pub fn texts(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.text.as_str()).collect()
    }

    /// Canonical topic/key, or the literal text of a `nid`.
    pub fn canonical(&self) -> &str {
        match &self.reference {
            Reference::Nid { text } => text,
            Reference::Rid { resolved, .. } => resolved,
            Reference::Sid { topic_key } => topic_key,
        }
    }
}

/// Splits `topic/key`, requiring exactly one forward slash.
pub fn split_topic_key(path: &str) -> Result<(&str, &str), String> {
    let mut parts = path.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(topic), Some(key), None) => Ok((topic, key)),
        (_, None, _) => Err(format!(
            "expecting at least one forward slash in topic/key path \"{path}\""
        )),
        _ => Err(format!(
            "expecting only one forward slash in topic/key path \"{path}\""
        )),
    }
}

/// Resolves references against a topic-key index.
pub struct ReferenceResolver<'a, I: ?Sized> {
    index: &'a I,
}

impl<'a, I: TopicKeyIndex + ?Sized> ReferenceResolver<'a, I> {
    pub fn new(index: &'a I) -> Self {
        Self { index }
    }

    /// Resolve one reference against the current liturgical day.
    pub fn resolve(
        &self,
        kind: ReferenceKind,
        raw: &str,
        overrides: Overrides,
        ldp: &LiturgicalDay,
    ) -> Result<Resolved, IndexError> {
        let mut messages = Vec::new();
        let reference = match kind {
            ReferenceKind::Nid => {
                if raw.is_empty() {
                    messages.push(Message::reference("nid value cannot be empty"));
                }
                Reference::Nid {
                    text: raw.to_string(),
                }
            }
            ReferenceKind::Sid => {
                self.check(raw, &mut messages)?;
                Reference::Sid {
                    topic_key: raw.to_string(),
                }
            }
            ReferenceKind::Rid => self.resolve_rid(raw, overrides, ldp, &mut messages)?,
        };
        Ok(Resolved {
            reference,
            messages,
        })
    }

    fn resolve_rid(
        &self,
        raw: &str,
        overrides: Overrides,
        ldp: &LiturgicalDay,
        messages: &mut Vec<Message>,
    ) -> Result<Reference, IndexError> {
        let unresolved = |mode, day| Reference::Rid {
            topic_key: raw.to_string(),
            resolved: raw.to_string(),
            mode,
            day,
        };
        let (topic, key) = match split_topic_key(raw) {
            Ok(parts) => parts,
            Err(message) => {
                messages.push(Message::reference(message));
                return Ok(unresolved(None, None));
            }
        };

        let mode = overrides.mode.and_then(|m| {
            let valid = (1..=8).contains(&m);
            if !valid {
                messages.push(Message {
                    subject: Subject::Mode,
                    text: format!("invalid mode override {m}, expected value between 1 and 8"),
                });
            }
            valid.then_some(m as u8)
        });
        let day = overrides.day.and_then(|d| {
            let valid = (1..=7).contains(&d);
            if !valid {
                messages.push(Message {
                    subject: Subject::Day,
                    text: format!("invalid day override {d}, expected value between 1 and 7"),
                });
            }
            valid.then_some(d as u8)
        });
        if !overrides.is_empty() && !is_octoechos_topic(topic) {
            messages.push(Message::reference(
                "rid directives (@Mode or @Day) may only be used for topics starting with 'oc' (i.e. Octoechos)",
            ));
            return Ok(unresolved(mode, day));
        }

        let resolved = format!("{}/{}", ldp.relative_topic(topic, mode, day), key);
        self.check(&resolved, messages)?;
        Ok(Reference::Rid {
            topic_key: raw.to_string(),
            resolved,
            mode,
            day,
        })
    }

    fn check(&self, path: &str, messages: &mut Vec<Message>) -> Result<(), IndexError> {
        match split_topic_key(path) {
            Ok((topic, key)) => {
                if !self.index.exists(topic, key)? {
                    trace!(topic, key, "topic/key not in index");
                    messages.push(Message::reference(format!(
                        "not found: topic/key '{path}' does not exist"
                    )));
                }
            }
            Err(message) => messages.push(Message::reference(message)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;
    use doxa_calendar::CalendarKind;

    fn day() -> LiturgicalDay {
        // Saturday, mode 6
        LiturgicalDay::from_ymd(2020, 3, 21, CalendarKind::Gregorian).unwrap()
    }

    fn index() -> MemoryIndex {
        MemoryIndex::with_entries([
            "actors/Deacon",
            "oc.m6.d7/ocVE.ApolTheotokionVM.text",
            "oc.m1.d1/ocVE.ApolTheotokionVM.text",
        ])
    }

    #[test]
    fn test_split_topic_key() {
        assert_eq!(split_topic_key("a/b"), Ok(("a", "b")));
        assert!(split_topic_key("ab").unwrap_err().contains("at least one"));
        assert!(split_topic_key("a/b/c").unwrap_err().contains("only one"));
    }

    #[test]
    fn test_sid_found_and_missing() {
        let idx = index();
        let resolver = ReferenceResolver::new(&idx);
        let found = resolver
            .resolve(ReferenceKind::Sid, "actors/Deacon", Overrides::default(), &day())
            .unwrap();
        assert!(found.messages.is_empty());
        assert_eq!(found.canonical(), "actors/Deacon");

        let missing = resolver
            .resolve(ReferenceKind::Sid, "actors/Reader", Overrides::default(), &day())
            .unwrap();
        assert_eq!(
            missing.texts(),
            vec!["not found: topic/key 'actors/Reader' does not exist"]
        );
    }

    #[test]
    fn test_rid_uses_liturgical_day() {
        let idx = index();
        let resolver = ReferenceResolver::new(&idx);
        let r = resolver
            .resolve(
                ReferenceKind::Rid,
                "oc.*/ocVE.ApolTheotokionVM.text",
                Overrides::default(),
                &day(),
            )
            .unwrap();
        assert!(r.messages.is_empty(), "{:?}", r.messages);
        assert_eq!(r.canonical(), "oc.m6.d7/ocVE.ApolTheotokionVM.text");
    }

    #[test]
    fn test_rid_overrides_win() {
        let idx = index();
        let resolver = ReferenceResolver::new(&idx);
        let r = resolver
            .resolve(
                ReferenceKind::Rid,
                "oc.*/ocVE.ApolTheotokionVM.text",
                Overrides {
                    mode: Some(1),
                    day: Some(1),
                },
                &day(),
            )
            .unwrap();
        assert!(r.messages.is_empty());
        assert_eq!(
            r.reference,
            Reference::Rid {
                topic_key: "oc.*/ocVE.ApolTheotokionVM.text".to_string(),
                resolved: "oc.m1.d1/ocVE.ApolTheotokionVM.text".to_string(),
                mode: Some(1),
                day: Some(1),
            }
        );
    }

    #[test]
    fn test_rid_override_out_of_range() {
        let idx = index();
        let resolver = ReferenceResolver::new(&idx);
        let r = resolver
            .resolve(
                ReferenceKind::Rid,
                "oc.*/ocVE.ApolTheotokionVM.text",
                Overrides {
                    mode: Some(9),
                    day: Some(0),
                },
                &day(),
            )
            .unwrap();
        assert_eq!(
            r.texts(),
            vec![
                "invalid mode override 9, expected value between 1 and 8",
                "invalid day override 0, expected value between 1 and 7",
            ]
        );
        assert_eq!(
            r.messages.iter().map(|m| m.subject).collect::<Vec<_>>(),
            vec![Subject::Mode, Subject::Day]
        );
        assert_eq!(r.canonical(), "oc.m6.d7/ocVE.ApolTheotokionVM.text");
    }

    #[test]
    fn test_rid_override_on_non_octoechos_topic() {
        let idx = index();
        let resolver = ReferenceResolver::new(&idx);
        let r = resolver
            .resolve(
                ReferenceKind::Rid,
                "me.*/meVE.Apolytikion",
                Overrides {
                    mode: Some(1),
                    day: None,
                },
                &day(),
            )
            .unwrap();
        assert_eq!(r.messages.len(), 1);
        assert!(r.messages[0].text.starts_with("rid directives (@Mode or @Day)"));
    }

    #[test]
    fn test_empty_nid() {
        let idx = index();
        let resolver = ReferenceResolver::new(&idx);
        let r = resolver
            .resolve(ReferenceKind::Nid, "", Overrides::default(), &day())
            .unwrap();
        assert_eq!(r.texts(), vec!["nid value cannot be empty"]);
    }

    #[test]
    fn test_malformed_path_reports_once() {
        let idx = index();
        let resolver = ReferenceResolver::new(&idx);
        for raw in ["actors", "a/b/c"] {
            let r = resolver
                .resolve(ReferenceKind::Rid, raw, Overrides::default(), &day())
                .unwrap();
            assert_eq!(r.messages.len(), 1, "{raw}");
        }
    }
}
