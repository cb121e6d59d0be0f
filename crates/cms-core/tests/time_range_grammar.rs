//! Integration tests: the class time-range grammar.

use cms_core::time_range::{ClockTime, Hour, Meridiem, Minute, TimePart, TimeRange};

fn every_clock_time() -> Vec<ClockTime> {
    let mut all = Vec::new();
    for hour in Hour::all() {
        for minute in Minute::ALL {
            for meridiem in Meridiem::ALL {
                all.push(ClockTime {
                    hour,
                    minute,
                    meridiem,
                });
            }
        }
    }
    all
}

#[test]
fn every_start_component_survives_serialize_and_parse() {
    let end = TimeRange::default().end;
    for start in every_clock_time() {
        let range = TimeRange { start, end };
        let reparsed = TimeRange::parse(&range.to_canonical()).expect("canonical parses");
        assert_eq!(reparsed, range, "{}", range.to_canonical());
    }
}

#[test]
fn every_end_component_survives_serialize_and_parse() {
    let start = TimeRange::default().start;
    for end in every_clock_time() {
        let range = TimeRange { start, end };
        let reparsed = TimeRange::parse(&range.to_canonical()).expect("canonical parses");
        assert_eq!(reparsed, range, "{}", range.to_canonical());
    }
}

#[test]
fn canonical_strings_are_reproduced_verbatim() {
    for input in [
        "7:00 PM - 8:00 PM",
        "12:45 AM - 1:15 AM",
        "6:30 AM - 7:30 AM",
        "11:15 PM - 12:00 AM",
    ] {
        assert_eq!(TimeRange::parse_or_default(input).to_canonical(), input);
    }
}

#[test]
fn malformed_strings_use_default_components() {
    let default = TimeRange::default();
    for input in ["", "garbage", "7:00 PM"] {
        let range = TimeRange::parse_or_default(input);
        for part in TimePart::ALL {
            assert_eq!(range.part(part), default.part(part), "{input:?} {part:?}");
        }
    }
    assert_eq!(default.part(TimePart::StartHour), "7");
    assert_eq!(default.part(TimePart::EndHour), "8");
    assert_eq!(default.part(TimePart::StartMinute), "00");
    assert_eq!(default.part(TimePart::EndMeridiem), "PM");
}

#[test]
fn editing_one_part_rewrites_whole_string() {
    let mut range = TimeRange::parse_or_default("not a time");
    range.set_part(TimePart::StartHour, "6").unwrap();
    assert_eq!(range.to_canonical(), "6:00 PM - 8:00 PM");
}
