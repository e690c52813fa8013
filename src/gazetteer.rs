//! Loading of the tab-delimited geographic reference files.
//!
//! Three files make up the gazetteer bundle, all tab-delimited with a
//! discarded header row:
//!
//! * [`COUNTRY_FILE`] — `numericCode<TAB>countryName`, one row per country;
//! * [`CITY_HINT_FILE`] — `placeName<TAB>placeID<TAB>countryCode`, cities
//!   famous enough that the bare name implies a country (`Montreal`);
//! * [`WORLD_CITY_FILE`] — `placeID<TAB>placeName<TAB>countryCode`, the
//!   full world place list; a name may map to places in several countries.
//!
//! A missing or empty file is fatal — resolution without reference data
//! would silently produce an empty corpus. Unparsable rows are fatal too,
//! since they indicate the wrong file rather than a stray bad line.
//! Duplicate names within a file are first-wins with a warning.
//!
//! The loaded [`Gazetteer`] is an immutable bundle handed by reference to
//! the resolvers; nothing mutates it after load.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domestic::state_code;
use crate::error::{Error, Result};

/// Country list file name: `numericCode<TAB>countryName`.
pub const COUNTRY_FILE: &str = "CountryNameListWithCodes.txt";
/// Default-country hints file name: `placeName<TAB>placeID<TAB>countryCode`.
pub const CITY_HINT_FILE: &str = "DefaultCountriesForSomeLocations.txt";
/// World place list file name: `placeID<TAB>placeName<TAB>countryCode`.
pub const WORLD_CITY_FILE: &str = "WorldCitiesWithCodes.txt";

/// A place identity: gazetteer place id plus its country's numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRef {
    /// Gazetteer place identifier, never 0.
    pub place_id: u32,
    /// Numeric country code, never 0.
    pub country_code: u32,
}

/// The immutable geographic reference bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gazetteer {
    countries: HashMap<String, u32>,
    city_hints: HashMap<String, PlaceRef>,
    places: HashMap<String, Vec<PlaceRef>>,
}

impl Gazetteer {
    /// Load the three reference files from `dir`.
    ///
    /// Fails with [`Error::MissingGazetteer`] if a file is absent,
    /// [`Error::EmptyGazetteer`] if it holds no data rows, and
    /// [`Error::MalformedGazetteer`] on any unparsable row.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut gaz = Gazetteer::default();

        let country_path = dir.join(COUNTRY_FILE);
        for (line_no, line) in read_rows(&country_path)? {
            let (code, name) = split2(&line)
                .ok_or_else(|| Error::malformed_gazetteer(&country_path, line_no, "expected 2 tab-delimited fields"))?;
            let code: u32 = code.trim().parse().map_err(|_| {
                Error::malformed_gazetteer(&country_path, line_no, "unparsable country code")
            })?;
            let key = normalize(name);
            if gaz.countries.contains_key(&key) {
                log::warn!("duplicate country name {:?} in {}; keeping first", name.trim(), country_path.display());
                continue;
            }
            gaz.countries.insert(key, code);
        }

        let hint_path = dir.join(CITY_HINT_FILE);
        for (line_no, line) in read_rows(&hint_path)? {
            let (name, place_id, country_code) = split3(&line)
                .ok_or_else(|| Error::malformed_gazetteer(&hint_path, line_no, "expected 3 tab-delimited fields"))?;
            let place = parse_place(place_id, country_code)
                .ok_or_else(|| Error::malformed_gazetteer(&hint_path, line_no, "unparsable place or country code"))?;
            let key = normalize(name);
            if gaz.city_hints.contains_key(&key) {
                log::warn!("duplicate hint {:?} in {}; keeping first", name.trim(), hint_path.display());
                continue;
            }
            gaz.city_hints.insert(key, place);
        }

        let world_path = dir.join(WORLD_CITY_FILE);
        for (line_no, line) in read_rows(&world_path)? {
            let (place_id, name, country_code) = split3(&line)
                .ok_or_else(|| Error::malformed_gazetteer(&world_path, line_no, "expected 3 tab-delimited fields"))?;
            let place = parse_place(place_id, country_code)
                .ok_or_else(|| Error::malformed_gazetteer(&world_path, line_no, "unparsable place or country code"))?;
            // US-state-named places would shadow the domestic resolver.
            if state_code(name).is_some() {
                log::debug!("excluding US-state-named place {:?} from world list", name.trim());
                continue;
            }
            gaz.places.entry(normalize(name)).or_default().push(place);
        }

        Ok(gaz)
    }

    /// Build a gazetteer directly from parts. Intended for test fixtures.
    #[must_use]
    pub fn from_parts(
        countries: &[(&str, u32)],
        city_hints: &[(&str, u32, u32)],
        places: &[(&str, u32, u32)],
    ) -> Self {
        let mut gaz = Gazetteer::default();
        for &(name, code) in countries {
            gaz.countries.insert(normalize(name), code);
        }
        for &(name, place_id, country_code) in city_hints {
            gaz.city_hints
                .insert(normalize(name), PlaceRef { place_id, country_code });
        }
        for &(name, place_id, country_code) in places {
            if state_code(name).is_some() {
                continue;
            }
            gaz.places
                .entry(normalize(name))
                .or_default()
                .push(PlaceRef { place_id, country_code });
        }
        gaz
    }

    /// Numeric code for a country name.
    #[must_use]
    pub fn country_code(&self, name: &str) -> Option<u32> {
        self.countries.get(&normalize(name)).copied()
    }

    /// Default-country hint for a famous place name.
    #[must_use]
    pub fn city_hint(&self, name: &str) -> Option<PlaceRef> {
        self.city_hints.get(&normalize(name)).copied()
    }

    /// Every place in the world list matching a name.
    #[must_use]
    pub fn places(&self, name: &str) -> &[PlaceRef] {
        self.places
            .get(&normalize(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The place id of `name` inside the given country, if the world list
    /// knows it there.
    #[must_use]
    pub fn place_in_country(&self, name: &str, country_code: u32) -> Option<u32> {
        self.places(name)
            .iter()
            .find(|p| p.country_code == country_code)
            .map(|p| p.place_id)
    }
}

/// Read a gazetteer file into `(line_number, line)` data rows. The first
/// line is a discarded header.
fn read_rows(path: &Path) -> Result<Vec<(usize, String)>> {
    if !path.exists() {
        return Err(Error::MissingGazetteer(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let rows: Vec<(usize, String)> = content
        .lines()
        .enumerate()
        .skip(1)
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| (i + 1, l.to_string()))
        .collect();
    if rows.is_empty() {
        return Err(Error::EmptyGazetteer(path.to_path_buf()));
    }
    Ok(rows)
}

fn split2(line: &str) -> Option<(&str, &str)> {
    let mut it = line.split('\t');
    let a = it.next()?;
    let b = it.next()?;
    if it.next().is_some() {
        return None;
    }
    Some((a, b))
}

fn split3(line: &str) -> Option<(&str, &str, &str)> {
    let mut it = line.split('\t');
    let a = it.next()?;
    let b = it.next()?;
    let c = it.next()?;
    if it.next().is_some() {
        return None;
    }
    Some((a, b, c))
}

fn parse_place(place_id: &str, country_code: &str) -> Option<PlaceRef> {
    Some(PlaceRef {
        place_id: place_id.trim().parse().ok()?,
        country_code: country_code.trim().parse().ok()?,
    })
}

/// Lookup keys are trimmed and lowercased.
fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
