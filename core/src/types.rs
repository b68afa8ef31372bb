//! Domain DTOs for the country-data API and the auth API.
//!
//! # Design
//! The country API projects fields with `?fields=`, so a list response only
//! carries a subset of what `/alpha/{code}` returns. Every field other than
//! `name` therefore defaults when absent, and defaults are skipped again on
//! serialization so a stored snapshot reloads into an identical value.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// One nation as returned by the country-data API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Country {
    pub name: CountryName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capital: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subregion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<Flags>,
    /// Language code (`fra`) to display name (`French`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub languages: BTreeMap<String, String>,
    /// Currency code (`EUR`) to its description.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub currencies: BTreeMap<String, Currency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timezones: Vec<String>,
    /// `cca3` codes of bordering countries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub borders: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cca3: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountryName {
    pub common: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub official: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Flags {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub png: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub svg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Currency {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl Country {
    /// Minimal record with only a code and a common name.
    pub fn new(cca3: &str, common: &str) -> Self {
        Self {
            name: CountryName {
                common: common.to_string(),
                official: String::new(),
            },
            capital: Vec::new(),
            region: String::new(),
            subregion: None,
            population: None,
            area: None,
            flags: None,
            languages: BTreeMap::new(),
            currencies: BTreeMap::new(),
            timezones: Vec::new(),
            borders: Vec::new(),
            cca3: cca3.to_string(),
        }
    }

    pub fn common_name(&self) -> &str {
        &self.name.common
    }

    /// Identity used by the favorites list: the three-letter code, or the
    /// common name for snapshots that were stored without one.
    pub fn favorite_key(&self) -> &str {
        if self.cca3.is_empty() {
            &self.name.common
        } else {
            &self.cca3
        }
    }

    pub fn capital_display(&self) -> String {
        if self.capital.is_empty() {
            "N/A".to_string()
        } else {
            self.capital.join(", ")
        }
    }

    /// Population with thousands separators, or `N/A`.
    pub fn population_display(&self) -> String {
        match self.population {
            Some(n) => group_thousands(n),
            None => "N/A".to_string(),
        }
    }

    pub fn language_names(&self) -> Vec<&str> {
        self.languages.values().map(String::as_str).collect()
    }

    /// `Euro (€)` style labels, one per currency.
    pub fn currency_labels(&self) -> Vec<String> {
        self.currencies
            .iter()
            .map(|(code, c)| {
                let name = if c.name.is_empty() { code.as_str() } else { c.name.as_str() };
                match &c.symbol {
                    Some(symbol) => format!("{name} ({symbol})"),
                    None => name.to_string(),
                }
            })
            .collect()
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Authenticated identity as reported by the auth API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub username: String,
}

/// Backends differ on id type; numeric ids are kept in decimal form.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    }))
}

/// Request payload for `/login` and `/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Success envelope of every auth endpoint. `user` is `null` when
/// `/check-session` finds no valid cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub user: Option<User>,
}
