/*
 * nesting.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Property tests for span nesting and override handling.
 */

use chrono::NaiveDate;
use doxa_calendar::CalendarKind;
use doxa_lml::{Compiler, CompilerOptions, MemoryIndex, NullIndex, Reference};
use proptest::prelude::*;

fn options() -> CompilerOptions {
    CompilerOptions::new(
        CalendarKind::Gregorian,
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
    )
}

/// `paragraphs` paragraphs, each holding one chain of `depth` nested spans
/// ending in a literal.
fn nested_source(paragraphs: usize, depth: usize) -> String {
    let mut source = String::from("{\n");
    for i in 0..paragraphs {
        source.push_str("p.x ");
        for _ in 1..depth {
            source.push_str("span.s ( ");
        }
        source.push_str(&format!("nid \"{i}\""));
        for _ in 1..depth {
            source.push_str(" )");
        }
        source.push('\n');
    }
    source.push('}');
    source
}

proptest! {
    #[test]
    fn prop_nesting_round_trips(paragraphs in 1usize..20, depth in 1usize..12) {
        let compiler = Compiler::new(&NullIndex).with_options(options());
        let c = compiler
            .compile_source("t", &nested_source(paragraphs, depth))
            .unwrap();
        prop_assert!(c.errors.is_empty(), "{:?}", c.errors);
        prop_assert_eq!(c.template.paragraphs.len(), paragraphs);
        for (i, paragraph) in c.template.paragraphs.iter().enumerate() {
            prop_assert_eq!(paragraph.spans.len(), 1);
            prop_assert_eq!(paragraph.spans[0].depth(), depth);
            let references: Vec<&Reference> = {
                let mut out = Vec::new();
                paragraph.spans[0].for_each_reference(&mut |r| out.push(r));
                out
            };
            let expected = Reference::Nid { text: i.to_string() };
            prop_assert_eq!(references, vec![&expected]);
        }
    }

    #[test]
    fn prop_overrides_dominate(mode in 1u8..=8, day in 1u8..=7, month in 1u32..=12) {
        let index = MemoryIndex::with_entries([format!("oc.m{mode}.d{day}/ocMA.Kathisma.text")]);
        let compiler = Compiler::new(&index).with_options(options());
        let source = format!(
            "Year = 2021\nMonth = {month}\nDay = 10\n{{ p.hymn rid \"oc.*/ocMA.Kathisma.text\" @Mode {mode} @Day {day} }}"
        );
        let c = compiler.compile_source("t", &source).unwrap();
        prop_assert!(c.errors.is_empty(), "{:?}", c.errors);
        let resolved = c.template.paragraphs[0].spans[0]
            .reference
            .as_ref()
            .and_then(Reference::topic_key)
            .map(str::to_string);
        prop_assert_eq!(resolved, Some(format!("oc.m{mode}.d{day}/ocMA.Kathisma.text")));
    }

    #[test]
    fn prop_malformed_paths_yield_one_error(slashes in prop_oneof![Just(0usize), 2usize..5]) {
        let path = vec!["seg"; slashes + 1].join("/");
        let source = format!("{{ p.a sid \"{path}\" p.b nid \"after\" }}");
        let compiler = Compiler::new(&NullIndex).with_options(options());
        let c = compiler.compile_source("t", &source).unwrap();
        prop_assert_eq!(c.errors.len(), 1);
        prop_assert_eq!(c.template.paragraphs.len(), 2);
    }
}
