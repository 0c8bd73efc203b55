use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One CSV row: a disaster plus, optionally, one of its application periods.
#[derive(Debug, Deserialize)]
pub(crate) struct DisasterRow {
    pub(crate) id: u32,
    pub(crate) disaster_request_no: String,
    pub(crate) title: String,
    pub(crate) state: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) region_category: Option<String>,
    pub(crate) benefit_begin_date: String,
    pub(crate) benefit_end_date: String,
    pub(crate) residency_required: String,
    #[serde(rename = "uses_DSED")]
    pub(crate) uses_dsed: String,
    pub(crate) allows_food_loss_alone: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) period_begin_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) period_end_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) registration_begin_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) registration_end_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) counties: Option<String>,
}

impl DisasterRow {
    /// Period columns must be all present or all blank.
    pub(crate) fn has_period(&self) -> bool {
        self.period_begin_date.is_some()
            || self.period_end_date.is_some()
            || self.registration_begin_date.is_some()
            || self.registration_end_date.is_some()
    }

    pub(crate) fn county_names(&self) -> Vec<String> {
        self.counties
            .as_deref()
            .map(|raw| {
                raw.split(';')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Rows paired with their 1-indexed CSV line, header excluded.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<(usize, DisasterRow)>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<DisasterRow>().enumerate() {
        rows.push((index + 2, record?));
    }

    Ok(rows)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}
