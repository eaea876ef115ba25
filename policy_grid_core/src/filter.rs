use serde::{Deserialize, Serialize};

/// Filter configuration applied to one grid column.
///
/// Serialized with a `kind` tag, this is the shape forwarded to the server when
/// a column is filtered by a list of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FilterModel {
    Text(TextFilterModel),
    Values(ValuesFilterModel),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFilterModel {
    pub condition: TextCondition,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValuesFilterModel {
    pub values: Vec<String>,
}

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
)]
#[serde(rename_all = "camelCase")]
pub enum TextCondition {
    #[default]
    #[strum(to_string = "Contains")]
    Contains,
    #[strum(to_string = "Does not contain")]
    NotContains,
    #[strum(to_string = "Equals")]
    Equals,
    #[strum(to_string = "Does not equal")]
    NotEqual,
    #[strum(to_string = "Starts with")]
    StartsWith,
    #[strum(to_string = "Ends with")]
    EndsWith,
    #[strum(to_string = "Blank")]
    Blank,
    #[strum(to_string = "Not blank")]
    NotBlank,
}

/// Which side resolves the filter: text conditions run against loaded rows, value lists go to
/// the server.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    #[strum(to_string = "Text")]
    Text,
    #[strum(to_string = "Values")]
    Values,
}

impl TextCondition {
    /// Blank checks ignore the filter value entirely.
    pub fn needs_value(&self) -> bool {
        !matches!(self, TextCondition::Blank | TextCondition::NotBlank)
    }

    /// Case-insensitive check of one cell against `filter_text`. A missing cell passes only
    /// [TextCondition::Blank]; every other condition, negated ones included, rejects it. An empty
    /// cell is blank but otherwise compared as an ordinary string.
    pub fn matches(&self, cell: Option<&str>, filter_text: &str) -> bool {
        let Some(cell) = cell else {
            return *self == TextCondition::Blank;
        };
        let cell = cell.to_lowercase();
        let filter_text = filter_text.to_lowercase();
        match self {
            TextCondition::Contains => cell.contains(&filter_text),
            TextCondition::NotContains => !cell.contains(&filter_text),
            TextCondition::Equals => cell == filter_text,
            TextCondition::NotEqual => cell != filter_text,
            TextCondition::StartsWith => cell.starts_with(&filter_text),
            TextCondition::EndsWith => cell.ends_with(&filter_text),
            TextCondition::Blank => cell.is_empty(),
            TextCondition::NotBlank => !cell.is_empty(),
        }
    }
}

impl TextFilterModel {
    pub fn new(condition: TextCondition, value: impl Into<String>) -> Self {
        TextFilterModel {
            condition,
            value: value.into(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.condition.needs_value() || !self.value.is_empty()
    }

    pub fn passes(&self, cell: Option<&str>) -> bool {
        if !self.is_active() {
            return true;
        }
        self.condition.matches(cell, &self.value)
    }
}

impl ValuesFilterModel {
    pub fn new<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        ValuesFilterModel {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Split raw textarea input into values, one per line plus any extra `separators`. Entries
    /// are kept verbatim, only blank ones are dropped, so joining values with new lines parses
    /// back to the same list.
    pub fn parse(raw: &str, separators: &[char]) -> Self {
        ValuesFilterModel {
            values: raw
                .split(|c: char| c == '\n' || separators.contains(&c))
                .map(|s| s.strip_suffix('\r').unwrap_or(s))
                .filter(|s| !s.trim().is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.values.is_empty()
    }
}

impl FilterModel {
    pub fn text(condition: TextCondition, value: impl Into<String>) -> Self {
        FilterModel::Text(TextFilterModel::new(condition, value))
    }

    pub fn values<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        FilterModel::Values(ValuesFilterModel::new(values))
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            FilterModel::Text(_) => FilterKind::Text,
            FilterModel::Values(_) => FilterKind::Values,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            FilterModel::Text(t) => t.is_active(),
            FilterModel::Values(v) => v.is_active(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn pass(condition: TextCondition, cell: Option<&str>, value: &str) -> bool {
        TextFilterModel::new(condition, value).passes(cell)
    }

    #[test]
    fn conditions_are_case_insensitive() {
        use TextCondition::*;
        assert!(pass(Equals, Some("Foo"), "foo"));
        assert!(!pass(NotEqual, Some("FOO"), "foo"));
        assert!(pass(NotEqual, Some("bar"), "foo"));
        assert!(pass(Contains, Some("Allow-DMZ-Web"), "dmz"));
        assert!(!pass(NotContains, Some("Allow-DMZ-Web"), "DMZ"));
        assert!(pass(NotContains, Some("deny-all"), "dmz"));
        assert!(pass(StartsWith, Some("10.0.0.1"), "10."));
        assert!(!pass(StartsWith, Some("192.168.0.1"), "10."));
        assert!(pass(EndsWith, Some("HTTPS"), "tps"));
        assert!(!pass(EndsWith, Some("HTTPS"), "http"));
    }

    #[test]
    fn blank_conditions() {
        use TextCondition::*;
        assert!(pass(Blank, None, ""));
        assert!(pass(Blank, Some(""), ""));
        assert!(!pass(Blank, Some("x"), ""));
        assert!(!pass(NotBlank, None, ""));
        assert!(!pass(NotBlank, Some(""), ""));
        assert!(pass(NotBlank, Some("x"), ""));
        // value is ignored for blank checks
        assert!(pass(Blank, None, "anything"));
    }

    #[test]
    fn missing_cell_passes_only_blank() {
        use TextCondition::*;
        for condition in TextCondition::iter() {
            assert_eq!(pass(condition, None, "a"), condition == Blank, "{condition:?}");
        }
        // an empty string is still a value for the negated conditions
        assert!(pass(NotContains, Some(""), "a"));
        assert!(pass(NotEqual, Some(""), "a"));
        assert!(!pass(Contains, Some(""), "a"));
    }

    #[test]
    fn empty_value_passes_everything() {
        for condition in TextCondition::iter().filter(|c| c.needs_value()) {
            let model = TextFilterModel::new(condition, "");
            assert!(!model.is_active());
            assert!(model.passes(None));
            assert!(model.passes(Some("abc")));
        }
    }

    #[test]
    fn activity() {
        assert!(FilterModel::text(TextCondition::Blank, "").is_active());
        assert!(FilterModel::text(TextCondition::NotBlank, "").is_active());
        assert!(!FilterModel::text(TextCondition::Contains, "").is_active());
        assert!(FilterModel::text(TextCondition::Contains, "x").is_active());
        assert!(!FilterModel::values(Vec::<String>::new()).is_active());
        assert!(FilterModel::values(["any"]).is_active());
    }

    #[test]
    fn parse_values_textarea() {
        let parsed = ValuesFilterModel::parse("10.0.0.1\r\n\n  \nAllow, DMZ\n padded \n10.0.0.1", &[]);
        assert_eq!(
            parsed.values,
            vec!["10.0.0.1", "Allow, DMZ", " padded ", "10.0.0.1"]
        );
        assert!(!ValuesFilterModel::parse(" \n\n", &[]).is_active());

        let comma = ValuesFilterModel::parse("https,ssh\n,", &[',']);
        assert_eq!(comma.values, vec!["https", "ssh"]);
    }

    #[test]
    fn json_shape() {
        let text = FilterModel::text(TextCondition::NotContains, "dmz");
        assert_eq!(
            text.to_json().unwrap(),
            r#"{"kind":"text","condition":"notContains","value":"dmz"}"#
        );
        let values = FilterModel::values(["https", "ssh"]);
        assert_eq!(
            values.to_json().unwrap(),
            r#"{"kind":"values","values":["https","ssh"]}"#
        );
        assert_eq!(FilterModel::from_json(&values.to_json().unwrap()).unwrap(), values);
        assert!(FilterModel::from_json(r#"{"kind":"regex"}"#).is_err());
    }
}
