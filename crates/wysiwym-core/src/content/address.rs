//! Structured postal addresses.

use serde::{Deserialize, Serialize};

/// An address node value.
///
/// Fields are rendered in British order: house number and street, place,
/// postcode, country, then telephone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
}

impl Address {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn street(mut self, house_number: impl Into<String>, street: impl Into<String>) -> Self {
        self.house_number = Some(house_number.into());
        self.street = Some(street.into());
        self
    }

    #[must_use]
    pub fn place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    #[must_use]
    pub fn postcode(mut self, postcode: impl Into<String>) -> Self {
        self.postcode = Some(postcode.into());
        self
    }

    #[must_use]
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    #[must_use]
    pub fn telephone(mut self, telephone: impl Into<String>) -> Self {
        self.telephone = Some(telephone.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// Non-empty rendering lines in British order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let first: Vec<&str> = [self.house_number.as_deref(), self.street.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if !first.is_empty() {
            lines.push(first.join(" "));
        }
        for field in [&self.place, &self.postcode, &self.country] {
            if let Some(value) = field.as_deref().filter(|s| !s.is_empty()) {
                lines.push(value.to_string());
            }
        }
        if let Some(phone) = self.telephone.as_deref().filter(|s| !s.is_empty()) {
            lines.push(format!("tel. {phone}"));
        }
        lines
    }

    /// Single-line rendering, `None` when no field is set.
    #[must_use]
    pub fn describe(&self) -> Option<String> {
        let lines = self.lines();
        if lines.is_empty() {
            None
        } else {
            Some(lines.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn british_order() {
        let address = Address::new()
            .country("United Kingdom")
            .postcode("AB24 3UE")
            .place("Aberdeen")
            .street("10", "King's College")
            .telephone("01224 272000");
        assert_eq!(
            address.lines(),
            vec![
                "10 King's College",
                "Aberdeen",
                "AB24 3UE",
                "United Kingdom",
                "tel. 01224 272000"
            ]
        );
    }

    #[test]
    fn partial_address() {
        let address = Address::new().place("Brighton");
        assert_eq!(address.describe().as_deref(), Some("Brighton"));
        assert!(Address::new().is_empty());
        assert_eq!(Address::new().describe(), None);
    }
}
