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

//! Vehicles and the drivers that operate them.

use serde::{Deserialize, Serialize};
use transit_core::schema::{Association, Entity, Field, FilterMode, Kind, Rule, Schema};

/// A vehicle that can be assigned to trips.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Vehicle {
    /// Make and model of the vehicle.
    pub model: String,

    /// Registration plate.
    pub registration_number: String,

    /// Number of passenger seats.
    pub capacity: i64,
}

/// Schema of `Vehicle`.
pub static VEHICLE: Schema = Schema {
    name: "vehicle",
    plural: "vehicles",
    title: "Vehicle",
    table: "vehicles",
    fields: &[
        Field::new("model", Kind::Text).filter(FilterMode::Partial).rules(&[Rule::Length(1, 64)]),
        Field::new("registration_number", Kind::Text)
            .filter(FilterMode::Exact)
            .rules(&[Rule::Length(2, 16)])
            .unique(),
        Field::new("capacity", Kind::Integer).filter(FilterMode::Range).rules(&[Rule::Positive]),
    ],
    associations: &[],
};

impl Entity for Vehicle {
    fn schema() -> &'static Schema {
        &VEHICLE
    }
}

/// A person licensed to drive vehicles.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Driver {
    /// Given name.
    pub first_name: String,

    /// Family name.
    pub last_name: String,

    /// Driving license identifier.
    pub license_number: String,
}

/// Schema of `Driver`.
pub static DRIVER: Schema = Schema {
    name: "driver",
    plural: "drivers",
    title: "Driver",
    table: "drivers",
    fields: &[
        Field::new("first_name", Kind::Text)
            .filter(FilterMode::Partial)
            .rules(&[Rule::Alphabetic, Rule::Length(1, 64)]),
        Field::new("last_name", Kind::Text)
            .filter(FilterMode::Partial)
            .rules(&[Rule::Alphabetic, Rule::Length(1, 64)]),
        Field::new("license_number", Kind::Text)
            .filter(FilterMode::Exact)
            .rules(&[Rule::Length(4, 20)])
            .unique(),
    ],
    associations: &[Association {
        name: "vehicles",
        table: "driver_vehicles",
        owner_column: "driver_uuid",
        member_column: "vehicle_uuid",
        member: &VEHICLE,
    }],
};

impl Entity for Driver {
    fn schema() -> &'static Schema {
        &DRIVER
    }
}
