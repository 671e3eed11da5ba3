// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Countries and cities.

use serde::{Deserialize, Serialize};
use transit_core::schema::{Entity, Field, FilterMode, Kind, Rule, Schema};
use uuid::Uuid;

/// A country where cities can be served.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Country {
    /// Full name of the country.
    pub name: String,

    /// Short alphabetic code of the country, such as `ES` or `ESP`.
    pub code: String,
}

/// Schema of `Country`.
pub static COUNTRY: Schema = Schema {
    name: "country",
    plural: "countries",
    title: "Country",
    table: "countries",
    fields: &[
        Field::new("name", Kind::Text)
            .filter(FilterMode::Partial)
            .rules(&[Rule::Alphabetic, Rule::Length(2, 64)])
            .unique(),
        Field::new("code", Kind::Text)
            .filter(FilterMode::Exact)
            .rules(&[Rule::Alphabetic, Rule::Length(2, 3)])
            .unique(),
    ],
    associations: &[],
};

impl Entity for Country {
    fn schema() -> &'static Schema {
        &COUNTRY
    }
}

/// A city that routes can start or end at.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct City {
    /// Name of the city.
    pub name: String,

    /// Country the city belongs to.
    pub country_uuid: Uuid,
}

/// Schema of `City`.
pub static CITY: Schema = Schema {
    name: "city",
    plural: "cities",
    title: "City",
    table: "cities",
    fields: &[
        Field::new("name", Kind::Text)
            .filter(FilterMode::Partial)
            .rules(&[Rule::Alphabetic, Rule::Length(1, 64)]),
        Field::new("country_uuid", Kind::Uuid).filter(FilterMode::Exact).references(&COUNTRY),
    ],
    associations: &[],
};

impl Entity for City {
    fn schema() -> &'static Schema {
        &CITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_country_from_json_ok() {
        let country = Country::from_json(&json!({"name": "Spain", "code": "ES"})).unwrap();
        assert_eq!(Country { name: "Spain".to_owned(), code: "ES".to_owned() }, country);
    }

    #[test]
    fn test_country_from_json_reports_all_errors() {
        let errors = Country::from_json(&json!({"name": "Sp4in", "code": "E"})).unwrap_err();
        assert_eq!(2, errors.len());
        assert_eq!(Some("must contain only letters"), errors.get("name"));
        assert_eq!(Some("must be between 2 and 3 characters long"), errors.get("code"));
    }

    #[test]
    fn test_city_requires_valid_country() {
        let errors = City::from_json(&json!({"name": "Madrid", "country_uuid": "x"})).unwrap_err();
        assert_eq!(Some("must be a valid UUID"), errors.get("country_uuid"));

        let errors = City::from_json(&json!({"name": "Madrid"})).unwrap_err();
        assert_eq!(Some("is required"), errors.get("country_uuid"));
    }
}
