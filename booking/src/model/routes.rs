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

//! Routes between cities and their prices.

use crate::model::{CITY, PASSENGER_TYPE};
use serde::{Deserialize, Serialize};
use transit_core::schema::{Association, Entity, Field, FilterMode, Kind, Rule, Schema};
use uuid::Uuid;

/// The fare that a type of passenger pays.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Price {
    /// Passenger type the fare applies to.
    pub passenger_type_uuid: Uuid,

    /// Amount to pay.
    pub price: f64,
}

/// Schema of `Price`.
pub static PRICE: Schema = Schema {
    name: "price",
    plural: "prices",
    title: "Price",
    table: "prices",
    fields: &[
        Field::new("passenger_type_uuid", Kind::Uuid)
            .filter(FilterMode::Exact)
            .references(&PASSENGER_TYPE),
        Field::new("price", Kind::Real).filter(FilterMode::Range).rules(&[Rule::NonNegative]),
    ],
    associations: &[],
};

impl Entity for Price {
    fn schema() -> &'static Schema {
        &PRICE
    }
}

/// A route between two cities.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Route {
    /// Name of the route.
    pub name: String,

    /// City where the route starts.
    pub origin_city_uuid: Uuid,

    /// City where the route ends.
    pub destination_city_uuid: Uuid,

    /// Length of the route.
    pub distance_km: f64,
}

/// Schema of `Route`.
pub static ROUTE: Schema = Schema {
    name: "route",
    plural: "routes",
    title: "Route",
    table: "routes",
    fields: &[
        Field::new("name", Kind::Text).filter(FilterMode::Partial).rules(&[Rule::Length(1, 128)]),
        Field::new("origin_city_uuid", Kind::Uuid).filter(FilterMode::Exact).references(&CITY),
        Field::new("destination_city_uuid", Kind::Uuid)
            .filter(FilterMode::Exact)
            .references(&CITY),
        Field::new("distance_km", Kind::Real).filter(FilterMode::Range).rules(&[Rule::Positive]),
    ],
    associations: &[Association {
        name: "prices",
        table: "route_prices",
        owner_column: "route_uuid",
        member_column: "price_uuid",
        member: &PRICE,
    }],
};

impl Entity for Route {
    fn schema() -> &'static Schema {
        &ROUTE
    }
}
