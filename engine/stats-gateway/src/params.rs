//! Query-string and path parameter parsing.
//!
//! Query strings arrive as a flat map; every malformed or missing identifier
//! becomes `InvalidScope` so it surfaces as a 400 with a useful message.

use stat_engine::StatsError;
use std::collections::HashMap;

pub type QueryParams = HashMap<String, String>;

/// Parse a positive identifier
pub fn parse_id(name: &str, raw: &str) -> Result<i64, StatsError> {
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(StatsError::invalid_scope(format!(
            "{name} must be a positive integer, got '{raw}'"
        ))),
    }
}

/// A required identifier from the query string
pub fn required_id(params: &QueryParams, name: &str) -> Result<i64, StatsError> {
    match params.get(name) {
        Some(raw) => parse_id(name, raw),
        None => Err(StatsError::invalid_scope(format!("missing query parameter {name}"))),
    }
}

/// A comma-separated identifier list, e.g. `playerID=1,2,3`. Absent means empty
pub fn id_list(params: &QueryParams, name: &str) -> Result<Vec<i64>, StatsError> {
    match params.get(name) {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_id(name, s))
            .collect(),
        None => Ok(Vec::new()),
    }
}

/// Requested stat fields from `statFields`, trimmed with blanks skipped
pub fn field_list(params: &QueryParams) -> Vec<String> {
    split_fields(params.get("statFields").map(String::as_str))
}

/// The single ranking stat of a top-N request, `statName` or `statFields`
pub fn stat_name(params: &QueryParams) -> Result<String, StatsError> {
    let raw = params
        .get("statName")
        .or_else(|| params.get("statFields"))
        .map(|s| s.trim())
        .unwrap_or_default();

    if raw.is_empty() {
        return Err(StatsError::invalid_scope("missing query parameter statName"));
    }
    Ok(raw.to_string())
}

/// Optional integer `limit`
pub fn limit(params: &QueryParams) -> Result<Option<i64>, StatsError> {
    match params.get("limit").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| {
                StatsError::invalid_scope(format!("limit must be an integer, got '{raw}'"))
            }),
        None => Ok(None),
    }
}

/// Optional non-blank text parameter
pub fn optional_text<'a>(params: &'a QueryParams, name: &str) -> Option<&'a str> {
    params.get(name).map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn split_fields(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_parse_id_rejects_garbage_and_non_positive() {
        assert_eq!(parse_id("teamID", " 17 ").unwrap(), 17);
        assert!(matches!(parse_id("teamID", "abc"), Err(StatsError::InvalidScope(_))));
        assert!(matches!(parse_id("teamID", "0"), Err(StatsError::InvalidScope(_))));
        assert!(matches!(parse_id("teamID", "-4"), Err(StatsError::InvalidScope(_))));
    }

    #[test]
    fn test_required_id_missing() {
        let err = required_id(&params(&[]), "seasonID").unwrap_err();
        assert_eq!(err, StatsError::InvalidScope("missing query parameter seasonID".to_string()));
    }

    #[test]
    fn test_id_list() {
        let p = params(&[("playerID", "3, 7,,9")]);
        assert_eq!(id_list(&p, "playerID").unwrap(), vec![3, 7, 9]);
        assert!(id_list(&params(&[]), "playerID").unwrap().is_empty());
        assert!(id_list(&params(&[("playerID", "3,x")]), "playerID").is_err());
    }

    #[test]
    fn test_field_list_trims_and_skips_blanks() {
        let p = params(&[("statFields", " goals, ,assists ,")]);
        assert_eq!(field_list(&p), vec!["goals", "assists"]);
        assert!(field_list(&params(&[])).is_empty());
    }

    #[test]
    fn test_stat_name_falls_back_to_stat_fields() {
        assert_eq!(stat_name(&params(&[("statName", "rating")])).unwrap(), "rating");
        assert_eq!(stat_name(&params(&[("statFields", "goals")])).unwrap(), "goals");
        assert!(stat_name(&params(&[("statName", "  ")])).is_err());
    }

    #[test]
    fn test_limit() {
        assert_eq!(limit(&params(&[])).unwrap(), None);
        assert_eq!(limit(&params(&[("limit", "-1")])).unwrap(), Some(-1));
        assert!(limit(&params(&[("limit", "ten")])).is_err());
    }
}
