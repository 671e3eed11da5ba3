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

//! Operations on the many-to-many associations between entities.

use crate::db;
use crate::driver::{TransitDriver, entity_error};
use transit_core::driver::DriverResult;
use transit_core::schema::{Association, Entity, Stored};
use uuid::Uuid;

impl TransitDriver {
    /// Links the `members` to the `owner` entity and returns the refreshed owner.
    pub async fn add_members<E: Entity>(
        self,
        association: &'static Association,
        owner: Uuid,
        members: Vec<Uuid>,
    ) -> DriverResult<Stored<E>> {
        let mut tx = self.db.begin().await?;
        db::add_members::<E>(tx.ex(), association, owner, &members)
            .await
            .map_err(|e| entity_error::<E>(Some(owner), e))?;
        let stored = db::get(tx.ex(), owner).await.map_err(|e| entity_error::<E>(Some(owner), e))?;
        tx.commit().await?;
        Ok(stored)
    }

    /// Unlinks the `members` from the `owner` entity and returns the refreshed owner.
    pub async fn remove_members<E: Entity>(
        self,
        association: &'static Association,
        owner: Uuid,
        members: Vec<Uuid>,
    ) -> DriverResult<Stored<E>> {
        let mut tx = self.db.begin().await?;
        db::remove_members::<E>(tx.ex(), association, owner, &members)
            .await
            .map_err(|e| entity_error::<E>(Some(owner), e))?;
        let stored = db::get(tx.ex(), owner).await.map_err(|e| entity_error::<E>(Some(owner), e))?;
        tx.commit().await?;
        Ok(stored)
    }
}
