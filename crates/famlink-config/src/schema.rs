//! Raw CSV rows (as read from the config file, before validation)

use crate::ConfigError;

/// Expected CSV header
pub const HEADER: &str = "App,Max Duration,Days,Time Ranges";

/// One CSV row, fields still unparsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRule {
    /// 1-based line number in the config file, for error reporting
    pub line: usize,

    /// App title as shown in Family Link (or Android package name)
    pub app: String,

    /// `H:MM` or empty (unlimited)
    pub max_duration: String,

    /// Weekday, `Start-End` range, or empty (every day)
    pub days: String,

    /// `HH:MM-HH:MM` or empty (all day)
    pub time_range: String,
}

/// Parse CSV content into raw rows.
///
/// `#` starts a comment (whole-line or trailing), blank lines are
/// skipped, and fields may be double-quoted to contain commas.
pub fn parse_csv(content: &str) -> Result<Vec<RawRule>, ConfigError> {
    let mut lines = content.lines().enumerate();

    // First non-blank, non-comment line must be the header
    let mut header = None;
    for (idx, raw_line) in lines.by_ref() {
        let stripped = strip_comment(raw_line);
        if stripped.trim().is_empty() {
            continue;
        }
        header = Some((idx + 1, stripped));
        break;
    }

    match header {
        Some((_, line)) if header_matches(&line) => {}
        _ => return Err(ConfigError::InvalidHeader),
    }

    let mut rows = Vec::new();
    for (idx, raw_line) in lines {
        let line_no = idx + 1;
        let stripped = strip_comment(raw_line);
        if stripped.trim().is_empty() {
            continue;
        }

        let fields = split_fields(&stripped);
        if fields.len() != 4 {
            return Err(ConfigError::BadRow {
                line: line_no,
                message: format!("expected 4 fields, found {}", fields.len()),
            });
        }

        rows.push(RawRule {
            line: line_no,
            app: fields[0].clone(),
            max_duration: fields[1].clone(),
            days: fields[2].clone(),
            time_range: fields[3].clone(),
        });
    }

    Ok(rows)
}

/// Render a starter rule table that blocks every listed app (`0:00`).
/// Used to bootstrap a config file from the remote catalog; the
/// parent then relaxes rows by hand.
pub fn default_table_csv<'a>(apps: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for app in apps {
        out.push_str(&quote_field(app));
        out.push_str(",0:00,,\n");
    }
    out
}

/// Quote a field if it contains CSV metacharacters
fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '#']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn header_matches(line: &str) -> bool {
    let fields = split_fields(line);
    let expected: Vec<&str> = HEADER.split(',').collect();
    fields.len() == expected.len()
        && fields.iter().zip(&expected).all(|(f, e)| f == e)
}

/// Remove a `#` comment, ignoring `#` inside double quotes
fn strip_comment(line: &str) -> String {
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return line[..i].to_string(),
            _ => {}
        }
    }
    line.to_string()
}

/// Split a CSV line into trimmed fields, honoring double quotes.
/// A doubled quote inside a quoted field is an escaped quote.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_rows() {
        let content = "\
App,Max Duration,Days,Time Ranges
Calculator,,,
Youtube,0:10,Mon-Fri,
Fortnite,1:00,Wed,13:00-18:00
";
        let rows = parse_csv(content).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].app, "Calculator");
        assert_eq!(rows[1].max_duration, "0:10");
        assert_eq!(rows[1].days, "Mon-Fri");
        assert_eq!(rows[2].time_range, "13:00-18:00");
        assert_eq!(rows[2].line, 4);
    }

    #[test]
    fn comments_and_blank_lines_ignored() {
        let content = "\
# family screen time policy
App,Max Duration,Days,Time Ranges

Youtube,0:30,Sat-Sun,   # weekend only
# Minecraft,1:00,,
";
        let rows = parse_csv(content).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].app, "Youtube");
        assert_eq!(rows[0].time_range, "");
    }

    #[test]
    fn quoted_app_names() {
        let content = "\
App,Max Duration,Days,Time Ranges
\"Clash, of Clans\",0:20,,
\"The \"\"Game\"\"\",,,
";
        let rows = parse_csv(content).unwrap();
        assert_eq!(rows[0].app, "Clash, of Clans");
        assert_eq!(rows[1].app, "The \"Game\"");
    }

    #[test]
    fn default_table_round_trips() {
        let csv = default_table_csv(["Youtube", "Clash, of Clans"]);
        let rows = parse_csv(&csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].max_duration, "0:00");
        assert_eq!(rows[1].app, "Clash, of Clans");
    }

    #[test]
    fn missing_header_rejected() {
        let content = "Youtube,0:10,Mon-Fri,\n";
        assert!(matches!(parse_csv(content), Err(ConfigError::InvalidHeader)));
    }

    #[test]
    fn wrong_field_count_rejected() {
        let content = "\
App,Max Duration,Days,Time Ranges
Youtube,0:10,Mon-Fri
";
        let err = parse_csv(content).unwrap_err();
        assert!(matches!(err, ConfigError::BadRow { line: 2, .. }));
    }
}
