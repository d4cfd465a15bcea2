/*
 * topic.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Rewriting of calendar-relative topics.
//!
//! A relative topic names a family of library entries and is resolved
//! against a [`LiturgicalDay`]:
//!
//! | Topic        | Resolved form                 |
//! |--------------|-------------------------------|
//! | `oc.*`       | `oc.m{mode}.d{day of week}`   |
//! | `me.*`       | `me.m{MM}.d{DD}`              |
//! | `le.go.eo.*` | `le.go.eo.w{eothinon:02}`     |
//! | `le.go.lu.*` | `le.go.lu.d{lukan cycle day}` |

use crate::ldp::LiturgicalDay;

pub const OCTOECHOS_TOPIC: &str = "oc.*";
pub const MENAION_TOPIC: &str = "me.*";
pub const EOTHINON_TOPIC: &str = "le.go.eo.*";
pub const LUKAN_TOPIC: &str = "le.go.lu.*";

/// True for topics of the Octoechos, the only ones accepting mode or day overrides.
pub fn is_octoechos_topic(topic: &str) -> bool {
    topic.starts_with("oc")
}

impl LiturgicalDay {
    /// Resolves `topic` against this day.
    ///
    /// `mode` and `day_of_week` replace the computed mode and day of week for
    /// Octoechos topics. Topics that are not relative are returned unchanged.
    pub fn relative_topic(&self, topic: &str, mode: Option<u8>, day_of_week: Option<u8>) -> String {
        match topic {
            OCTOECHOS_TOPIC => format!(
                "oc.m{}.d{}",
                mode.unwrap_or(self.mode_of_week),
                day_of_week.unwrap_or_else(|| self.day_of_week_number())
            ),
            MENAION_TOPIC => format!("me.m{:02}.d{:02}", self.month, self.day),
            EOTHINON_TOPIC => format!("le.go.eo.w{:02}", self.eothinon),
            LUKAN_TOPIC => format!("le.go.lu.d{}", self.days_since_start_of_lukan_cycle),
            _ => topic.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::CalendarKind;

    #[test]
    fn test_octoechos_prefix() {
        assert!(is_octoechos_topic("oc.*"));
        assert!(is_octoechos_topic("oc.m1.d1"));
        assert!(!is_octoechos_topic("me.*"));
        assert!(!is_octoechos_topic("actors"));
    }

    #[test]
    fn test_overrides_replace_computed_values() {
        let day = LiturgicalDay::from_ymd(2020, 3, 21, CalendarKind::Gregorian).unwrap();
        assert_eq!(day.relative_topic("oc.*", None, None), "oc.m6.d7");
        assert_eq!(day.relative_topic("oc.*", Some(1), None), "oc.m1.d7");
        assert_eq!(day.relative_topic("oc.*", Some(2), Some(3)), "oc.m2.d3");
    }

    #[test]
    fn test_absolute_topic_unchanged() {
        let day = LiturgicalDay::from_ymd(2020, 3, 21, CalendarKind::Gregorian).unwrap();
        assert_eq!(day.relative_topic("actors", None, None), "actors");
    }

    #[test]
    fn test_menaion_uses_julian_label() {
        // civil 2021-01-19 is Theophany on the Julian calendar
        let day = LiturgicalDay::from_ymd(2021, 1, 6, CalendarKind::Julian).unwrap();
        assert_eq!(day.relative_topic("me.*", None, None), "me.m01.d06");
    }
}
