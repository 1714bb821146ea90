//! Render-ready snapshot of the search flow.

use std::fmt;

use aqi_client::{Place, Reading};

pub const FOOTER_NOTE: &str =
    "NOTE: This app can only make 1,000 requests per day, so it may not always be available.";

/// Selected place shown above the panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub description: String,
}

/// One entry of the candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOption {
    pub id: String,
    pub label: String,
}

impl From<&Place> for PlaceOption {
    fn from(place: &Place) -> Self {
        Self {
            id: place.id.clone(),
            label: place.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacesPanel {
    Searching,
    Error(String),
    Listed(Vec<PlaceOption>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingRow {
    pub name: String,
    pub value: String,
    pub unit: Option<String>,
    pub color: String,
}

impl From<&Reading> for ReadingRow {
    fn from(reading: &Reading) -> Self {
        Self {
            name: reading.name.clone(),
            value: reading.value.to_string(),
            unit: reading.unit_label().map(str::to_string),
            color: reading.color.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadingsPanel {
    Loading,
    Error(String),
    /// Nothing to show (empty query, or no place picked yet)
    Hidden,
    NoData,
    Rows(Vec<ReadingRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchView {
    pub query: String,
    pub prefix_filter: bool,
    pub header: Option<Header>,
    pub places: PlacesPanel,
    pub readings: ReadingsPanel,
}

impl fmt::Display for SearchView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Air Quality")?;
        writeln!(
            f,
            "Search: {}{}",
            self.query,
            if self.prefix_filter { "  [prefix filter on]" } else { "" }
        )?;

        if let Some(header) = &self.header {
            writeln!(f)?;
            writeln!(f, "== {} ==", header.name)?;
            writeln!(f, "   {}", header.description)?;
        }

        writeln!(f)?;
        match &self.places {
            PlacesPanel::Searching => writeln!(f, "Fetching places...")?,
            PlacesPanel::Error(message) => writeln!(f, "! {}", message)?,
            PlacesPanel::Listed(options) => {
                writeln!(f, "{} Places Found", options.len())?;
                for (index, option) in options.iter().enumerate() {
                    writeln!(f, "  [{}] {}", index + 1, option.label)?;
                }
            }
        }

        writeln!(f)?;
        match &self.readings {
            ReadingsPanel::Loading => writeln!(f, "LOADING...")?,
            ReadingsPanel::Error(message) => writeln!(f, "! {}", message)?,
            ReadingsPanel::Hidden => {}
            ReadingsPanel::NoData => writeln!(f, "No data for this location.")?,
            ReadingsPanel::Rows(rows) => {
                for row in rows {
                    write!(f, "  {}: {}", row.name, row.value)?;
                    if let Some(unit) = &row.unit {
                        write!(f, " ({})", unit)?;
                    }
                    if !row.color.is_empty() {
                        write!(f, "  {}", row.color)?;
                    }
                    writeln!(f)?;
                }
            }
        }

        writeln!(f)?;
        write!(f, "{}", FOOTER_NOTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqi_client::ReadingValue;

    fn view() -> SearchView {
        SearchView {
            query: "Lon".into(),
            prefix_filter: false,
            header: None,
            places: PlacesPanel::Listed(vec![]),
            readings: ReadingsPanel::Hidden,
        }
    }

    #[test]
    fn reading_row_from_reading() {
        let reading = Reading {
            kind: "pm25".into(),
            name: "PM2.5".into(),
            value: ReadingValue::Number(12.0),
            unit: Some("µg/m³".into()),
            color: "#0f0".into(),
        };

        let row = ReadingRow::from(&reading);
        assert_eq!(row.value, "12");
        assert_eq!(row.unit.as_deref(), Some("µg/m³"));
    }

    #[test]
    fn renders_rows_with_optional_unit() {
        let mut v = view();
        v.readings = ReadingsPanel::Rows(vec![
            ReadingRow {
                name: "AQI".into(),
                value: "42".into(),
                unit: None,
                color: "#0f0".into(),
            },
            ReadingRow {
                name: "PM2.5".into(),
                value: "12".into(),
                unit: Some("µg/m³".into()),
                color: String::new(),
            },
        ]);

        let out = v.to_string();
        assert!(out.contains("  AQI: 42  #0f0\n"));
        assert!(out.contains("  PM2.5: 12 (µg/m³)\n"));
        assert!(out.ends_with(FOOTER_NOTE));
    }

    #[test]
    fn renders_place_count_and_labels() {
        let mut v = view();
        v.places = PlacesPanel::Listed(vec![PlaceOption {
            id: "p1".into(),
            label: "London - UK".into(),
        }]);
        v.header = Some(Header {
            name: "London".into(),
            description: "UK".into(),
        });

        let out = v.to_string();
        assert!(out.contains("== London ==\n"));
        assert!(out.contains("1 Places Found\n  [1] London - UK\n"));
    }

    #[test]
    fn renders_status_lines() {
        let mut v = view();
        v.places = PlacesPanel::Searching;
        v.readings = ReadingsPanel::NoData;

        let out = v.to_string();
        assert!(out.contains("Fetching places..."));
        assert!(out.contains("No data for this location."));
    }
}
