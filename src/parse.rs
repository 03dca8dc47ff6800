use cgmath::vec2;
use thiserror::Error;

use crate::sky::Sky;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: expected 4 numeric fields, found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("line {line}: bad integer {token:?}")]
    BadInt {
        line: usize,
        token: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("no stars in input")]
    Empty,
}

/// Parse one star per line: the first two integers on a line are its
/// position, the next two its velocity. Anything non-numeric separates
/// fields, so the usual `position=< 9,  1> velocity=< 0,  2>` layout works
/// as well as plain whitespace. Blank lines are skipped; a non-blank line
/// with other than 4 integers is rejected.
pub fn parse_stars(input: &str) -> Result<Sky, ParseError> {
    let mut stars = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let mut fields = [0i64; 4];
        let mut found = 0;
        for token in raw
            .split(|c: char| !c.is_ascii_digit() && c != '-')
            .filter(|t| !t.is_empty())
        {
            if found < 4 {
                fields[found] = token.parse().map_err(|source| ParseError::BadInt {
                    line,
                    token: token.to_string(),
                    source,
                })?;
            }
            found += 1;
        }
        if found != 4 {
            return Err(ParseError::FieldCount { line, found });
        }

        stars.push((vec2(fields[0], fields[1]), vec2(fields[2], fields[3])));
    }

    if stars.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(Sky::from_stars(&stars))
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_parse_puzzle_layout() {
        let sky = parse_stars(concat!(
            "position=< 9,  1> velocity=< 0,  2>\n",
            "position=<-3, 11> velocity=< 1, -2>\n",
        ))
        .unwrap();

        assert_eq!(sky.len(), 2);
        assert_eq!(sky.positions(), &array![[9i64, 1], [-3, 11]]);
    }

    #[test]
    fn test_parse_applies_velocities_on_step() {
        let mut sky = parse_stars("position=< 9,  1> velocity=< 0,  2>").unwrap();

        sky.step();

        assert_eq!(sky.positions(), &array![[9i64, 3]]);
    }

    #[test]
    fn test_parse_takes_bare_numbers_too() {
        let sky = parse_stars("-6 10 2 -2").unwrap();
        assert_eq!(sky.positions(), &array![[-6i64, 10]]);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let sky = parse_stars("\n1 2 3 4\n\n   \n5 6 7 8\n").unwrap();
        assert_eq!(sky.len(), 2);
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        match parse_stars("1 2 3 4\n1 2 3\n") {
            Err(ParseError::FieldCount { line: 2, found: 3 }) => {}
            other => panic!("unexpected: {:?}", other),
        }
        match parse_stars("1 2 3 4 5\n") {
            Err(ParseError::FieldCount { line: 1, found: 5 }) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_bad_integer() {
        match parse_stars("99999999999999999999 2 3 4\n") {
            Err(ParseError::BadInt { line: 1, token, .. }) => {
                assert_eq!(token, "99999999999999999999");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(matches!(parse_stars(""), Err(ParseError::Empty)));
        assert!(matches!(parse_stars("\n   \n"), Err(ParseError::Empty)));
    }
}
