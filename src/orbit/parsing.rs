use super::OrbitError;

/// Splits 2- or 3-line TLE text into (name, line1, line2).
pub fn parse_tle_lines(tle: &str) -> Result<(Option<String>, String, String), OrbitError> {
    let lines: Vec<&str> = tle
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    match lines.as_slice() {
        [line1, line2] => Ok((None, line1.to_string(), line2.to_string())),
        [name, line1, line2] => Ok((
            Some(name.trim_start_matches("0 ").to_string()),
            line1.to_string(),
            line2.to_string(),
        )),
        _ => Err(OrbitError::InvalidTleFormat),
    }
}
