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

//! Lookup types that classify other entities.

use serde::{Deserialize, Serialize};
use transit_core::schema::{Entity, Field, FilterMode, Kind, Rule, Schema};

/// Fields shared by all lookup types that only carry a name.
const NAME_ONLY: &[Field] = &[Field::new("name", Kind::Text)
    .filter(FilterMode::Partial)
    .rules(&[Rule::Length(2, 64)])
    .unique()];

/// Kind of identity document carried by a passenger.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DocumentType {
    /// Name of the document type, such as `Passport`.
    pub name: String,
}

/// Schema of `DocumentType`.
pub static DOCUMENT_TYPE: Schema = Schema {
    name: "document_type",
    plural: "document_types",
    title: "Document type",
    table: "document_types",
    fields: NAME_ONLY,
    associations: &[],
};

impl Entity for DocumentType {
    fn schema() -> &'static Schema {
        &DOCUMENT_TYPE
    }
}

/// Category of passenger, which determines the applicable prices.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PassengerType {
    /// Name of the passenger type, such as `Child`.
    pub name: String,

    /// Optional free-form description.
    pub description: Option<String>,
}

/// Schema of `PassengerType`.
pub static PASSENGER_TYPE: Schema = Schema {
    name: "passenger_type",
    plural: "passenger_types",
    title: "Passenger type",
    table: "passenger_types",
    fields: &[
        Field::new("name", Kind::Text)
            .filter(FilterMode::Partial)
            .rules(&[Rule::Length(2, 64)])
            .unique(),
        Field::new("description", Kind::Text).optional().rules(&[Rule::Length(0, 255)]),
    ],
    associations: &[],
};

impl Entity for PassengerType {
    fn schema() -> &'static Schema {
        &PASSENGER_TYPE
    }
}

/// Stage in the life of an order.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct OrderStatusType {
    /// Name of the status, such as `Paid`.
    pub name: String,
}

/// Schema of `OrderStatusType`.
pub static ORDER_STATUS_TYPE: Schema = Schema {
    name: "order_status_type",
    plural: "order_status_types",
    title: "Order status type",
    table: "order_status_types",
    fields: NAME_ONLY,
    associations: &[],
};

impl Entity for OrderStatusType {
    fn schema() -> &'static Schema {
        &ORDER_STATUS_TYPE
    }
}

/// How often a trip repeats.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RegularityType {
    /// Name of the regularity, such as `Daily`.
    pub name: String,
}

/// Schema of `RegularityType`.
pub static REGULARITY_TYPE: Schema = Schema {
    name: "regularity_type",
    plural: "regularity_types",
    title: "Regularity type",
    table: "regularity_types",
    fields: NAME_ONLY,
    associations: &[],
};

impl Entity for RegularityType {
    fn schema() -> &'static Schema {
        &REGULARITY_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_passenger_type_description_is_optional() {
        let passenger_type = PassengerType::from_json(&json!({"name": "Adult"})).unwrap();
        assert_eq!(PassengerType { name: "Adult".to_owned(), description: None }, passenger_type);

        let passenger_type =
            PassengerType::from_json(&json!({"name": "Adult", "description": "Over 18"})).unwrap();
        assert_eq!(Some("Over 18"), passenger_type.description.as_deref());
    }

    #[test]
    fn test_name_only_lookups_validate_name() {
        let errors = DocumentType::from_json(&json!({"name": " "})).unwrap_err();
        assert_eq!(Some("is required"), errors.get("name"));

        let errors = RegularityType::from_json(&json!({"name": "x"})).unwrap_err();
        assert_eq!(Some("must be between 2 and 64 characters long"), errors.get("name"));
    }
}
