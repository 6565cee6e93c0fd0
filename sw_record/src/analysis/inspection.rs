/// Inspection comment scraping.
///
/// Some field-visit values only exist as free text typed into an
/// inspection's comment box (wire-weight checkbar readings, crest-stage
/// gage condition codes). Anything that does not match comes back as
/// `None`; a malformed comment is never an error.

const CSG_INSPECTED_KEY: &str = "GageInspectedCode";
const CSG_INTAKE_KEY: &str = "IntakeHoleConditionCode";
const CSG_VENT_KEY: &str = "VentHoleConditionCode";
const HOLE_CONDITIONS: &[&str] = &["Open", "Partially plugged", "Plugged"];

/// First `digits.digits` number in a wire-weight gage inspection comment.
pub fn checkbar_value(comment: &str) -> Option<f64> {
    let bytes = comment.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        if !bytes[start].is_ascii_digit() {
            start += 1;
            continue;
        }
        let point = digit_run_end(bytes, start);
        if bytes.get(point) == Some(&b'.') {
            let end = digit_run_end(bytes, point + 1);
            if end > point + 1 {
                return comment[start..end].parse().ok();
            }
        }
        start = point;
    }
    None
}

fn digit_run_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |n| from + n)
}

/// Crest-stage gage condition codes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsgInspection {
    pub inspected_code: Option<String>,
    pub intake_code: Option<String>,
    pub vent_code: Option<String>,
}

impl CsgInspection {
    /// Overlay codes found in a later inspection onto this one.
    pub fn merge(&mut self, later: CsgInspection) {
        if later.inspected_code.is_some() {
            self.inspected_code = later.inspected_code;
        }
        if later.intake_code.is_some() {
            self.intake_code = later.intake_code;
        }
        if later.vent_code.is_some() {
            self.vent_code = later.vent_code;
        }
    }
}

/// Value of the first `key = value` line holding `key`, trimmed.
fn keyed_value<'a>(key: &str, text: &'a str) -> Option<&'a str> {
    text.lines().find_map(|line| {
        let rest = &line[line.find(key)? + key.len()..];
        let value = rest.trim_start().strip_prefix('=')?.trim();
        if value.is_empty() { None } else { Some(value) }
    })
}

/// A hole condition code, when the value starts with a known one.
fn hole_condition(key: &str, text: &str) -> Option<String> {
    let value = keyed_value(key, text)?;
    HOLE_CONDITIONS
        .iter()
        .find(|c| value.starts_with(*c))
        .map(|c| c.to_string())
}

pub fn parse_csg_comment(comment: &str) -> CsgInspection {
    CsgInspection {
        inspected_code: keyed_value(CSG_INSPECTED_KEY, comment).map(str::to_string),
        intake_code: hole_condition(CSG_INTAKE_KEY, comment),
        vent_code: hole_condition(CSG_VENT_KEY, comment),
    }
}

/// Human wording for Aquarius control-condition enum values.
pub fn control_condition_label(raw: &str) -> &str {
    match raw {
        "DebrisLight" => "Light Debris",
        "DebrisModerate" => "Moderate Debris",
        "DebrisHeavy" => "Heavy Debris",
        other => other,
    }
}

/// `"{code}, {condition}, {distance}' DS"`; the distance is blank when the
/// visitor did not enter one.
pub fn format_control_condition(code: &str, condition: &str, distance_ft: Option<f64>) -> String {
    let distance = distance_ft.map(|d| d.to_string()).unwrap_or_default();
    format!(
        "{}, {}, {}' DS",
        code,
        control_condition_label(condition),
        distance
    )
}
