//! Bulk inventory import format: a header line, then
//! `set_code,card_number,count` per line.

/// One parsed data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvLine {
    pub set_code: String,
    pub card_number: String,
    pub count: i32,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    pub lines: Vec<CsvLine>,
    /// Data lines that could not be parsed (wrong column count, bad count).
    pub malformed: u64,
}

/// Blank lines are ignored; the first non-blank line is the header.
pub fn parse_inventory_csv(content: &str) -> ParsedCsv {
    let mut out = ParsedCsv::default();
    let content = content.trim_start_matches('\u{feff}');

    for line in content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .skip(1)
    {
        match parse_line(line) {
            Some(l) => out.lines.push(l),
            None => out.malformed += 1,
        }
    }
    out
}

fn parse_line(line: &str) -> Option<CsvLine> {
    let cols: Vec<&str> = line.split(',').map(str::trim).collect();
    let [set_code, card_number, count] = cols.as_slice() else {
        return None;
    };
    if set_code.is_empty() || card_number.is_empty() {
        return None;
    }
    let count: i32 = count.parse().ok().filter(|c| *c > 0)?;
    Some(CsvLine {
        set_code: set_code.to_string(),
        card_number: card_number.to_string(),
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_after_header() {
        let p = parse_inventory_csv("set_code,card_number,count\r\nSVI,25,3\nPAL, 12 ,1\n");
        assert_eq!(p.malformed, 0);
        assert_eq!(
            p.lines,
            vec![
                CsvLine { set_code: "SVI".into(), card_number: "25".into(), count: 3 },
                CsvLine { set_code: "PAL".into(), card_number: "12".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn malformed_lines_are_counted_not_fatal() {
        let p = parse_inventory_csv("h\nSVI,25\nSVI,25,x\nSVI,25,0\n,1,1\nSVI,1,2\n\n");
        assert_eq!(p.malformed, 4);
        assert_eq!(p.lines.len(), 1);
    }

    #[test]
    fn header_only_or_empty_input() {
        assert_eq!(parse_inventory_csv(""), ParsedCsv::default());
        assert_eq!(parse_inventory_csv("set_code,card_number,count"), ParsedCsv::default());
    }
}
