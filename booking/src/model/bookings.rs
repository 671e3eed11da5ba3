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

//! Trips, the passengers that book them and how they pay.

use crate::model::{
    DOCUMENT_TYPE, DRIVER, ORDER_STATUS_TYPE, PASSENGER_TYPE, REGULARITY_TYPE, ROUTE, VEHICLE,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use transit_core::schema::{Association, Entity, Field, FilterMode, Kind, Rule, Schema};
use uuid::Uuid;

/// A scheduled run of a vehicle along a route.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Trip {
    /// Route followed by the trip.
    pub route_uuid: Uuid,

    /// Vehicle assigned to the trip.
    pub vehicle_uuid: Uuid,

    /// Driver assigned to the trip.
    pub driver_uuid: Uuid,

    /// How often the trip repeats.
    pub regularity_type_uuid: Uuid,

    /// Scheduled departure time.
    #[serde(with = "time::serde::rfc3339")]
    pub departure_at: OffsetDateTime,

    /// Scheduled arrival time.
    #[serde(with = "time::serde::rfc3339")]
    pub arrival_at: OffsetDateTime,
}

/// Schema of `Trip`.
pub static TRIP: Schema = Schema {
    name: "trip",
    plural: "trips",
    title: "Trip",
    table: "trips",
    fields: &[
        Field::new("route_uuid", Kind::Uuid).filter(FilterMode::Exact).references(&ROUTE),
        Field::new("vehicle_uuid", Kind::Uuid).filter(FilterMode::Exact).references(&VEHICLE),
        Field::new("driver_uuid", Kind::Uuid).filter(FilterMode::Exact).references(&DRIVER),
        Field::new("regularity_type_uuid", Kind::Uuid)
            .filter(FilterMode::Exact)
            .references(&REGULARITY_TYPE),
        Field::new("departure_at", Kind::Timestamp).filter(FilterMode::Range),
        Field::new("arrival_at", Kind::Timestamp).filter(FilterMode::Range),
    ],
    associations: &[],
};

impl Entity for Trip {
    fn schema() -> &'static Schema {
        &TRIP
    }
}

/// A person that travels on trips.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Passenger {
    /// Given name.
    pub first_name: String,

    /// Family name.
    pub last_name: String,

    /// Kind of identity document presented.
    pub document_type_uuid: Uuid,

    /// Number of the identity document.
    pub document_number: String,

    /// Category of the passenger.
    pub passenger_type_uuid: Uuid,
}

/// Schema of `Passenger`.
pub static PASSENGER: Schema = Schema {
    name: "passenger",
    plural: "passengers",
    title: "Passenger",
    table: "passengers",
    fields: &[
        Field::new("first_name", Kind::Text)
            .filter(FilterMode::Partial)
            .rules(&[Rule::Alphabetic, Rule::Length(1, 64)]),
        Field::new("last_name", Kind::Text)
            .filter(FilterMode::Partial)
            .rules(&[Rule::Alphabetic, Rule::Length(1, 64)]),
        Field::new("document_type_uuid", Kind::Uuid)
            .filter(FilterMode::Exact)
            .references(&DOCUMENT_TYPE),
        Field::new("document_number", Kind::Text)
            .filter(FilterMode::Exact)
            .rules(&[Rule::Digits, Rule::Length(6, 12)])
            .unique(),
        Field::new("passenger_type_uuid", Kind::Uuid)
            .filter(FilterMode::Exact)
            .references(&PASSENGER_TYPE),
    ],
    associations: &[],
};

impl Entity for Passenger {
    fn schema() -> &'static Schema {
        &PASSENGER
    }
}

/// A seat booked by a passenger on a trip.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Order {
    /// Trip the order is for.
    pub trip_uuid: Uuid,

    /// Passenger that travels.
    pub passenger_uuid: Uuid,

    /// Current status of the order.
    pub order_status_type_uuid: Uuid,

    /// Seat assigned to the passenger.
    pub seat_number: i64,

    /// Amount to pay for the order.
    pub total: f64,
}

/// Schema of `Order`.
pub static ORDER: Schema = Schema {
    name: "order",
    plural: "orders",
    title: "Order",
    table: "orders",
    fields: &[
        Field::new("trip_uuid", Kind::Uuid).filter(FilterMode::Exact).references(&TRIP),
        Field::new("passenger_uuid", Kind::Uuid).filter(FilterMode::Exact).references(&PASSENGER),
        Field::new("order_status_type_uuid", Kind::Uuid)
            .filter(FilterMode::Exact)
            .references(&ORDER_STATUS_TYPE),
        Field::new("seat_number", Kind::Integer).filter(FilterMode::Range).rules(&[Rule::Positive]),
        Field::new("total", Kind::Real).filter(FilterMode::Range).rules(&[Rule::NonNegative]),
    ],
    associations: &[],
};

impl Entity for Order {
    fn schema() -> &'static Schema {
        &ORDER
    }
}

/// A payment that settles one or more orders.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Payment {
    /// Amount paid.
    pub amount: f64,

    /// Payment method, such as `card`.
    pub method: String,

    /// When the payment was made.
    #[serde(with = "time::serde::rfc3339")]
    pub paid_at: OffsetDateTime,
}

/// Schema of `Payment`.
pub static PAYMENT: Schema = Schema {
    name: "payment",
    plural: "payments",
    title: "Payment",
    table: "payments",
    fields: &[
        Field::new("amount", Kind::Real).filter(FilterMode::Range).rules(&[Rule::Positive]),
        Field::new("method", Kind::Text).filter(FilterMode::Exact).rules(&[Rule::Length(2, 32)]),
        Field::new("paid_at", Kind::Timestamp).filter(FilterMode::Range),
    ],
    associations: &[Association {
        name: "orders",
        table: "payment_orders",
        owner_column: "payment_uuid",
        member_column: "order_uuid",
        member: &ORDER,
    }],
};

impl Entity for Payment {
    fn schema() -> &'static Schema {
        &PAYMENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trip_timestamps_are_normalized_to_utc() {
        let trip = Trip::from_json(&json!({
            "route_uuid": Uuid::new_v4().to_string(),
            "vehicle_uuid": Uuid::new_v4().to_string(),
            "driver_uuid": Uuid::new_v4().to_string(),
            "regularity_type_uuid": Uuid::new_v4().to_string(),
            "departure_at": "2024-05-06T09:00:00+02:00",
            "arrival_at": "2024-05-06T10:30:00.1234567Z",
        }))
        .unwrap();
        assert_eq!(
            OffsetDateTime::from_unix_timestamp(1714978800).unwrap(),
            trip.departure_at
        );
        assert_eq!(123456000, trip.arrival_at.nanosecond());
    }

    #[test]
    fn test_passenger_document_number_must_be_digits() {
        let errors = Passenger::from_json(&json!({
            "first_name": "Ana",
            "last_name": "García",
            "document_type_uuid": Uuid::new_v4().to_string(),
            "document_number": "12AB5678",
            "passenger_type_uuid": Uuid::new_v4().to_string(),
        }))
        .unwrap_err();
        assert_eq!(1, errors.len());
        assert_eq!(Some("must contain only digits"), errors.get("document_number"));
    }

    #[test]
    fn test_payment_reports_missing_fields() {
        let errors = Payment::from_json(&json!({"amount": 10.0})).unwrap_err();
        assert_eq!(2, errors.len());
        assert_eq!(Some("is required"), errors.get("method"));
        assert_eq!(Some("is required"), errors.get("paid_at"));
    }
}
