//! Versioned extraction rule tables.
//!
//! Every pattern the extractors use lives here, with a stable rule ID, so a
//! rule change shows up as a diff to one table entry and each rule can be
//! tested on its own. Bump `RULESET_VERSION` whenever a pattern changes.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub const RULESET_VERSION: u32 = 1;

/// What an inspection rule extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InspectionField {
    /// A description block; the room is the block's leading room phrase.
    Description,
    /// A `<room>: <observation>` line.
    LabeledLine,
}

/// What a thermal rule extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThermalField {
    ImageId,
    Hotspot,
    Coldspot,
    Difference,
}

impl ThermalField {
    pub fn name(&self) -> &'static str {
        match self {
            ThermalField::ImageId => "image_id",
            ThermalField::Hotspot => "hotspot",
            ThermalField::Coldspot => "coldspot",
            ThermalField::Difference => "difference",
        }
    }
}

/// A compiled pattern with its rule metadata.
pub struct InspectionRule {
    pub id: &'static str,
    pub field: InspectionField,
    pub regex: Regex,
    pub description: &'static str,
}

pub struct ThermalRule {
    pub id: &'static str,
    pub field: ThermalField,
    pub regex: Regex,
    pub description: &'static str,
}

/// Inspection rules, in the order their matches are reported.
///
/// Description markers swallow an optional trailing colon on the same line.
/// The labeled-line rule captures `label` (up to the first colon, at most 60
/// characters) and `obs` (the rest of the line, trimmed, non-empty).
pub static INSPECTION_RULES: LazyLock<Vec<InspectionRule>> = LazyLock::new(|| {
    vec![
        InspectionRule {
            id: "inspection.negative-description",
            field: InspectionField::Description,
            regex: Regex::new(r"(?i)Negative side Description[ \t]*:?").unwrap(),
            description: "Negative side Description followed by text up to the next terminator",
        },
        InspectionRule {
            id: "inspection.positive-description",
            field: InspectionField::Description,
            regex: Regex::new(r"(?i)Positive side Description[ \t]*:?").unwrap(),
            description: "Positive side Description followed by text up to the next terminator",
        },
        InspectionRule {
            id: "inspection.labeled-line",
            field: InspectionField::LabeledLine,
            regex: Regex::new(
                r"(?mR)^[^\S\r\n]*(?P<label>[^:\r\n]{1,60}?)[^\S\r\n]*:[^\S\r\n]*(?P<obs>[^\r\n]*?\S)[^\S\r\n]*$",
            )
            .unwrap(),
            description: "a '<room label>: <observation>' line outside any description block",
        },
    ]
});

/// Ends a description block. Matched anywhere, not only at line start.
pub static DESCRIPTION_TERMINATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)Negative side photographs|Positive side|Negative side Description|Impacted Area|Photo [0-9]+",
    )
    .unwrap()
});

/// Thermal field lines. Each captures the raw `value` for strict parsing.
pub static THERMAL_RULES: LazyLock<Vec<ThermalRule>> = LazyLock::new(|| {
    vec![
        ThermalRule {
            id: "thermal.image-id",
            field: ThermalField::ImageId,
            regex: Regex::new(
                r"(?mR)^[ \t]*(?i:image(?:[ \t]*(?:id|name|no\.?))?)[ \t]*:[ \t]*(?P<value>[^\r\n]*?)[ \t]*$",
            )
            .unwrap(),
            description: "Image ID / Image / Image Name / Image No: <token>, starts a block",
        },
        ThermalRule {
            id: "thermal.hotspot",
            field: ThermalField::Hotspot,
            regex: Regex::new(
                r"(?mR)^[ \t]*(?i:hot[ \t]*spot(?:[ \t]+temp(?:erature)?)?)[ \t]*:[ \t]*(?P<value>[^\r\n]*?)[ \t]*$",
            )
            .unwrap(),
            description: "Hotspot[ Temperature]: <value>",
        },
        ThermalRule {
            id: "thermal.coldspot",
            field: ThermalField::Coldspot,
            regex: Regex::new(
                r"(?mR)^[ \t]*(?i:cold[ \t]*spot(?:[ \t]+temp(?:erature)?)?)[ \t]*:[ \t]*(?P<value>[^\r\n]*?)[ \t]*$",
            )
            .unwrap(),
            description: "Coldspot[ Temperature]: <value>",
        },
        ThermalRule {
            id: "thermal.difference",
            field: ThermalField::Difference,
            regex: Regex::new(
                r"(?mR)^[ \t]*(?i:(?:temp(?:erature)?[ \t]+)?diff(?:erence)?)[ \t]*:[ \t]*(?P<value>[^\r\n]*?)[ \t]*$",
            )
            .unwrap(),
            description: "[Temperature ]Difference / Diff: <value>",
        },
    ]
});

/// Strict numeric grammar for thermal values, with an optional unit.
pub static NUMERIC_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<number>[+-]?[0-9]+(?:\.[0-9]+)?)[ \t]*(?P<unit>°C|°F|deg C|deg F|C|F|K)?$").unwrap()
});

/// Lines of source text. `\r\n`, `\n` and a lone `\r` each end a line,
/// the same boundaries the `(?mR)` patterns above use for `^` and `$`.
/// Anything that walks text line by line goes through here so it sees the
/// lines the rules see.
pub fn source_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let s = rest?;
        match s.find(['\r', '\n']) {
            Some(end) => {
                let next = if s[end..].starts_with("\r\n") { end + 2 } else { end + 1 };
                rest = Some(&s[next..]);
                Some(&s[..end])
            }
            None => {
                rest = None;
                (!s.is_empty()).then_some(s)
            }
        }
    })
}

/// One row of the printable rule listing.
#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub id: &'static str,
    pub field: String,
    pub pattern: String,
    pub description: &'static str,
}

/// Both rule tables plus the shared patterns, for display.
#[derive(Debug, Clone, Serialize)]
pub struct RuleListing {
    pub version: u32,
    pub inspection: Vec<RuleSummary>,
    pub description_terminator: String,
    pub thermal: Vec<RuleSummary>,
    pub numeric_value: String,
}

pub fn listing() -> RuleListing {
    RuleListing {
        version: RULESET_VERSION,
        inspection: INSPECTION_RULES
            .iter()
            .map(|r| RuleSummary {
                id: r.id,
                field: format!("{:?}", r.field),
                pattern: r.regex.as_str().to_string(),
                description: r.description,
            })
            .collect(),
        description_terminator: DESCRIPTION_TERMINATOR.as_str().to_string(),
        thermal: THERMAL_RULES
            .iter()
            .map(|r| RuleSummary {
                id: r.id,
                field: r.field.name().to_string(),
                pattern: r.regex.as_str().to_string(),
                description: r.description,
            })
            .collect(),
        numeric_value: NUMERIC_VALUE.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inspection_rule(id: &str) -> &'static InspectionRule {
        INSPECTION_RULES.iter().find(|r| r.id == id).unwrap()
    }

    fn thermal(field: ThermalField) -> &'static ThermalRule {
        THERMAL_RULES.iter().find(|r| r.field == field).unwrap()
    }

    fn captures<'t>(regex: &Regex, text: &'t str, group: &str) -> Vec<&'t str> {
        regex
            .captures_iter(text)
            .filter_map(|c| c.name(group).map(|m| m.as_str()))
            .collect()
    }

    // ── Inspection rules ─────────────────────────────────────────────────────

    #[test]
    fn rule_ids_are_unique() {
        let mut ids: Vec<&str> = INSPECTION_RULES.iter().map(|r| r.id).collect();
        ids.extend(THERMAL_RULES.iter().map(|r| r.id));
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn description_markers_take_optional_colon() {
        let rule = inspection_rule("inspection.negative-description");
        let m = rule.regex.find("Negative side Description:  Hall dampness").unwrap();
        assert_eq!(m.as_str(), "Negative side Description:");

        let rule = inspection_rule("inspection.positive-description");
        assert!(rule.regex.is_match("POSITIVE SIDE DESCRIPTION\nKitchen seepage"));
    }

    #[test]
    fn labeled_line_splits_at_first_colon() {
        let rule = inspection_rule("inspection.labeled-line");
        let text = "Kitchen: Seepage below sink: severe\n  Bedroom 1 :  Paint peeling  \r\nNo colon here\nEmpty:   \n";

        assert_eq!(captures(&rule.regex, text, "label"), ["Kitchen", "Bedroom 1"]);
        assert_eq!(
            captures(&rule.regex, text, "obs"),
            ["Seepage below sink: severe", "Paint peeling"]
        );
    }

    #[test]
    fn source_lines_end_where_the_rules_end_lines() {
        let text = "Kitchen: Seepage\rHall: Dampness\r\n\nTerrace: Cracks\nlast";
        let lines: Vec<&str> = source_lines(text).collect();
        assert_eq!(lines, ["Kitchen: Seepage", "Hall: Dampness", "", "Terrace: Cracks", "last"]);

        let rule = inspection_rule("inspection.labeled-line");
        let labeled = lines.iter().filter(|l| rule.regex.is_match(l)).count();
        assert_eq!(labeled, rule.regex.find_iter(text).count());

        assert_eq!(source_lines("a\n").collect::<Vec<_>>(), ["a"]);
        assert_eq!(source_lines("").count(), 0);
    }

    #[test]
    fn labeled_line_rejects_long_labels() {
        let rule = inspection_rule("inspection.labeled-line");
        let long = format!("{}: observation", "x".repeat(61));
        assert!(!rule.regex.is_match(&long));
        let ok = format!("{}: observation", "x".repeat(60));
        assert!(rule.regex.is_match(&ok));
    }

    #[test]
    fn terminators_match_case_insensitively() {
        for t in [
            "negative side PHOTOGRAPHS",
            "Positive side",
            "Negative Side Description",
            "impacted area 3",
            "Photo 12",
        ] {
            assert!(DESCRIPTION_TERMINATOR.is_match(t), "should terminate: {t}");
        }
        assert!(!DESCRIPTION_TERMINATOR.is_match("Photograph of wall"));
    }

    // ── Thermal rules ────────────────────────────────────────────────────────

    #[test]
    fn image_id_variants() {
        let rule = thermal(ThermalField::ImageId);
        let text = "Image ID: IMG-001\nimage: RB02380X.JPG\nImage Name : IR_0042\nImage No.: 7\nImagery: none\n";
        assert_eq!(
            captures(&rule.regex, text, "value"),
            ["IMG-001", "RB02380X.JPG", "IR_0042", "7"]
        );
    }

    #[test]
    fn temperature_field_variants() {
        let text = "Hotspot: 31.2 °C\nHot spot temperature: 30\nColdspot Temp: 24.1\nTemperature Difference: 7.1\nDiff: 6\n";
        assert_eq!(captures(&thermal(ThermalField::Hotspot).regex, text, "value"), ["31.2 °C", "30"]);
        assert_eq!(captures(&thermal(ThermalField::Coldspot).regex, text, "value"), ["24.1"]);
        assert_eq!(captures(&thermal(ThermalField::Difference).regex, text, "value"), ["7.1", "6"]);
    }

    #[test]
    fn numeric_grammar_is_strict() {
        for ok in ["31.2", "-4", "+0.5", "31.2 °C", "31.2°F", "20 deg C", "300K", "12 C"] {
            assert!(NUMERIC_VALUE.is_match(ok), "should parse: {ok}");
        }
        for bad in ["hot", "31.", ".5", "31,2", "31.2 celsius", "~30", "31.2 °C approx", ""] {
            assert!(!NUMERIC_VALUE.is_match(bad), "should reject: {bad}");
        }
    }

    #[test]
    fn listing_carries_version_and_every_rule() {
        let listing = listing();
        assert_eq!(listing.version, RULESET_VERSION);
        assert_eq!(listing.inspection.len(), INSPECTION_RULES.len());
        assert_eq!(listing.thermal.len(), 4);
    }
}
