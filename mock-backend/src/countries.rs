//! Country lookups answered from the in-memory dataset.
//!
//! Matching mirrors the public API closely enough for the client: names match
//! by case-insensitive substring, everything else case-insensitively exact.
//! An empty match set is a 404 with the API's error body.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct FieldsQuery {
    pub fields: Option<String>,
}

type Lookup = Result<Json<Vec<Value>>, (StatusCode, Json<Value>)>;

pub async fn all(State(state): State<SharedState>, Query(query): Query<FieldsQuery>) -> Json<Vec<Value>> {
    Json(project(state.countries.iter(), query.fields.as_deref()))
}

pub async fn by_name(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(query): Query<FieldsQuery>,
) -> Lookup {
    let needle = name.to_lowercase();
    matching(&state, &query, |c| {
        ["common", "official"].iter().any(|k| {
            c["name"][*k]
                .as_str()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
        })
    })
}

pub async fn by_region(
    State(state): State<SharedState>,
    Path(region): Path<String>,
    Query(query): Query<FieldsQuery>,
) -> Lookup {
    matching(&state, &query, |c| {
        c["region"].as_str().is_some_and(|r| r.eq_ignore_ascii_case(&region))
    })
}

/// Matches either the language code (`fra`) or its name (`french`).
pub async fn by_language(
    State(state): State<SharedState>,
    Path(language): Path<String>,
    Query(query): Query<FieldsQuery>,
) -> Lookup {
    matching(&state, &query, |c| {
        c["languages"].as_object().is_some_and(|langs| {
            langs.iter().any(|(code, name)| {
                code.eq_ignore_ascii_case(&language)
                    || name.as_str().is_some_and(|n| n.eq_ignore_ascii_case(&language))
            })
        })
    })
}

pub async fn by_currency(
    State(state): State<SharedState>,
    Path(currency): Path<String>,
    Query(query): Query<FieldsQuery>,
) -> Lookup {
    matching(&state, &query, |c| {
        c["currencies"]
            .as_object()
            .is_some_and(|currencies| currencies.keys().any(|k| k.eq_ignore_ascii_case(&currency)))
    })
}

/// Answered as a one-element array, as the public API does.
pub async fn by_code(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Query(query): Query<FieldsQuery>,
) -> Lookup {
    matching(&state, &query, |c| {
        c["cca3"].as_str().is_some_and(|cca3| cca3.eq_ignore_ascii_case(&code))
    })
}

fn matching(state: &SharedState, query: &FieldsQuery, predicate: impl Fn(&Value) -> bool) -> Lookup {
    let found = project(
        state.countries.iter().filter(|c| predicate(*c)),
        query.fields.as_deref(),
    );
    if found.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "status": 404, "message": "Not Found" })),
        ));
    }
    Ok(Json(found))
}

/// Keep only the comma-separated top-level `fields`; no projection when the
/// parameter is absent or blank.
fn project<'a>(countries: impl Iterator<Item = &'a Value>, fields: Option<&str>) -> Vec<Value> {
    let wanted: Vec<&str> = fields
        .map(|f| f.split(',').map(str::trim).filter(|f| !f.is_empty()).collect())
        .unwrap_or_default();
    countries
        .map(|country| {
            if wanted.is_empty() {
                return country.clone();
            }
            let Some(object) = country.as_object() else {
                return country.clone();
            };
            let projected: Map<String, Value> = object
                .iter()
                .filter(|(k, _)| wanted.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            Value::Object(projected)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_keeps_requested_keys_only() {
        let countries = vec![json!({"name": {"common": "France"}, "cca3": "FRA", "area": 1.0})];
        let out = project(countries.iter(), Some("name,cca3"));
        assert_eq!(out[0], json!({"name": {"common": "France"}, "cca3": "FRA"}));
    }

    #[test]
    fn project_without_fields_is_identity() {
        let countries = vec![json!({"cca3": "FRA", "area": 1.0})];
        assert_eq!(project(countries.iter(), None), countries);
        assert_eq!(project(countries.iter(), Some(" ")), countries);
    }
}
