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

//! Operations on single entities and on collections of entities.

use crate::db;
use crate::driver::{TransitDriver, entity_error};
use transit_core::driver::DriverResult;
use transit_core::query::{Meta, Parameters};
use transit_core::schema::{Entity, Stored};
use uuid::Uuid;

impl TransitDriver {
    /// Creates a new `entity`, identified by `uuid` if given or by a new identifier otherwise.
    pub async fn create<E: Entity>(self, uuid: Option<Uuid>, entity: E) -> DriverResult<Stored<E>> {
        let now = self.clock.now_utc();
        let mut tx = self.db.begin().await?;
        let stored =
            db::save(tx.ex(), uuid, &entity, now).await.map_err(|e| entity_error::<E>(uuid, e))?;
        tx.commit().await?;
        Ok(stored)
    }

    /// Gets the entity `uuid` with its relations.
    pub async fn get<E: Entity>(self, uuid: Uuid) -> DriverResult<Stored<E>> {
        let mut tx = self.db.begin().await?;
        let stored = db::get(tx.ex(), uuid).await.map_err(|e| entity_error::<E>(Some(uuid), e))?;
        tx.commit().await?;
        Ok(stored)
    }

    /// Gets the page of entities selected by `params`.
    pub async fn list<E: Entity>(self, params: Parameters) -> DriverResult<(Vec<Stored<E>>, Meta)> {
        let mut tx = self.db.begin().await?;
        let result = db::list(tx.ex(), &params).await?;
        tx.commit().await?;
        Ok(result)
    }

    /// Replaces the contents of the entity `uuid` with `entity`.
    pub async fn update<E: Entity>(self, uuid: Uuid, entity: E) -> DriverResult<Stored<E>> {
        let now = self.clock.now_utc();
        let mut tx = self.db.begin().await?;
        let stored = db::update(tx.ex(), uuid, &entity, now)
            .await
            .map_err(|e| entity_error::<E>(Some(uuid), e))?;
        tx.commit().await?;
        Ok(stored)
    }

    /// Deletes the entity `uuid`.
    pub async fn delete<E: Entity>(self, uuid: Uuid) -> DriverResult<()> {
        let now = self.clock.now_utc();
        let mut tx = self.db.begin().await?;
        db::delete::<E>(tx.ex(), uuid, now).await.map_err(|e| entity_error::<E>(Some(uuid), e))?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use crate::model::{City, Country, Price};
    use time::macros::datetime;
    use transit_core::db::DbError;
    use transit_core::driver::DriverError;
    use transit_core::model::FieldErrors;

    fn spain() -> Country {
        Country { name: "Spain".to_owned(), code: "ES".to_owned() }
    }

    #[tokio::test]
    async fn test_create_ok() {
        let context = TestContext::setup().await;

        let stored = context.driver().create(None, spain()).await.unwrap();
        assert_eq!(&spain(), stored.entity());
        assert_eq!(datetime!(2023-11-14 22:13:20 UTC), *stored.created_at());
        assert_eq!(stored.created_at(), stored.updated_at());

        let mut ex = context.ex().await;
        assert_eq!(stored, db::get::<Country>(&mut ex, *stored.uuid()).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_with_uuid() {
        let context = TestContext::setup().await;
        let uuid = Uuid::new_v4();

        let stored = context.driver().create(Some(uuid), spain()).await.unwrap();
        assert_eq!(uuid, *stored.uuid());

        let other = Country { name: "France".to_owned(), code: "FR".to_owned() };
        assert_eq!(
            DriverError::InvalidInput(FieldErrors::from([("uuid", "already exists")])),
            context.driver().create(Some(uuid), other).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_create_duplicate() {
        let context = TestContext::setup().await;

        context.driver().create(None, spain()).await.unwrap();
        match context.driver().create(None, spain()).await {
            Err(DriverError::InvalidInput(errors)) => {
                assert_eq!(Some("already exists"), errors.get("name"));
                assert_eq!(Some("already exists"), errors.get("code"));
            }
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_get_ok() {
        let context = TestContext::setup().await;

        let country = context.driver().create(None, spain()).await.unwrap();
        let city = City { name: "Madrid".to_owned(), country_uuid: *country.uuid() };
        let city = context.driver().create(None, city).await.unwrap();

        let stored = context.driver().get::<City>(*city.uuid()).await.unwrap();
        assert_eq!(city, stored);
        assert_eq!("ES", stored.related()["country"]["code"]);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let context = TestContext::setup().await;
        let uuid = Uuid::new_v4();

        assert_eq!(
            DriverError::NotFound(format!("Country {} not found", uuid)),
            context.driver().get::<Country>(uuid).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_list_ok() {
        let context = TestContext::setup().await;
        let passenger_type_uuid = Uuid::new_v4();

        let mut exp = vec![];
        for amount in [10.0, 150.0, 20.0] {
            let price = Price { passenger_type_uuid, price: amount };
            exp.push(context.driver().create(None, price).await.unwrap());
        }

        let (prices, meta) = context.driver().list::<Price>(Parameters::default()).await.unwrap();
        assert_eq!(exp, prices);
        assert_eq!(Meta { page: 1, per_page: 5, total: 3, total_pages: 1 }, meta);

        let params = Parameters::from_query(Some("price=150.0"), Price::schema().fields).unwrap();
        let (prices, meta) = context.driver().list::<Price>(params).await.unwrap();
        assert_eq!(vec![exp[1].clone()], prices);
        assert_eq!(1, meta.total);
    }

    #[tokio::test]
    async fn test_update_ok() {
        let context = TestContext::setup().await;

        let stored = context.driver().create(None, spain()).await.unwrap();
        let spain2 = Country { name: "Spain".to_owned(), code: "ESP".to_owned() };
        let updated = context.driver().update(*stored.uuid(), spain2.clone()).await.unwrap();
        assert_eq!(&spain2, updated.entity());
        assert_eq!(stored.created_at(), updated.created_at());
        assert!(updated.updated_at() > stored.updated_at());
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let context = TestContext::setup().await;
        let uuid = Uuid::new_v4();

        assert_eq!(
            DriverError::NotFound(format!("Country {} not found", uuid)),
            context.driver().update(uuid, spain()).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_delete_ok() {
        let context = TestContext::setup().await;

        let stored = context.driver().create(None, spain()).await.unwrap();
        context.driver().delete::<Country>(*stored.uuid()).await.unwrap();

        let mut ex = context.ex().await;
        assert_eq!(
            DbError::NotFound,
            db::get::<Country>(&mut ex, *stored.uuid()).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let context = TestContext::setup().await;
        let uuid = Uuid::new_v4();

        assert_eq!(
            DriverError::NotFound(format!("Country {} not found", uuid)),
            context.driver().delete::<Country>(uuid).await.unwrap_err()
        );
    }
}
