use std::collections::HashMap;
use serde::Deserialize;
use serde_json::Value;

/// DataPoint returns a bare object instead of a one element array when there is only one item
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(t) => vec![t],
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct SiteList {
    #[serde(rename = "Locations")]
    pub locations: SiteListLocations,
}

#[derive(Deserialize, Debug)]
pub struct SiteListLocations {
    #[serde(rename = "Location")]
    pub location: OneOrMany<Site>,
}

#[derive(Deserialize, Debug)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub latitude: String,
    pub longitude: String,
}

#[derive(Deserialize, Debug)]
pub struct SiteRepDocument {
    #[serde(rename = "SiteRep")]
    pub site_rep: SiteRep,
}

#[derive(Deserialize, Debug)]
pub struct SiteRep {
    #[serde(rename = "Wx")]
    pub wx: Wx,
    #[serde(rename = "DV")]
    pub dv: Dv,
}

#[derive(Deserialize, Debug)]
pub struct Wx {
    #[serde(rename = "Param")]
    pub param: OneOrMany<Param>,
}

#[derive(Deserialize, Debug)]
pub struct Param {
    pub name: String,
    pub units: String,
    #[serde(rename = "$")]
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct Dv {
    #[serde(rename = "Location")]
    pub location: RepLocation,
}

#[derive(Deserialize, Debug)]
pub struct RepLocation {
    pub i: String,
    pub lat: String,
    pub lon: String,
    pub name: String,
    #[serde(default)]
    pub elevation: Option<String>,
    #[serde(rename = "Period")]
    pub period: OneOrMany<Period>,
}

#[derive(Deserialize, Debug)]
pub struct Period {
    pub value: String,
    #[serde(rename = "Rep")]
    pub rep: OneOrMany<HashMap<String, Value>>,
}
