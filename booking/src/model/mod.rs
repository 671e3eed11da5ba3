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

//! Entities of the booking domain.
//!
//! Every entity is a plain serde type paired with a static `Schema` that describes how its
//! fields are validated, filtered, stored and related to other entities.  The rest of the
//! service is written once against `Entity` and instantiated for each type listed here.

mod bookings;
mod fleet;
mod geo;
mod lookups;
mod routes;

pub use bookings::{ORDER, Order, PASSENGER, PAYMENT, Passenger, Payment, TRIP, Trip};
pub use fleet::{DRIVER, Driver, VEHICLE, Vehicle};
pub use geo::{CITY, COUNTRY, City, Country};
pub use lookups::{
    DOCUMENT_TYPE, DocumentType, ORDER_STATUS_TYPE, OrderStatusType, PASSENGER_TYPE,
    PassengerType, REGULARITY_TYPE, RegularityType,
};
pub use routes::{PRICE, Price, ROUTE, Route};
