//! [`Note`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{note, user, Note},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `notes` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, user_id, title, content, category, created_at, updated_at";

/// Reads a [`Note`] from the provided [`Row`] selected with [`COLUMNS`].
fn from_row(row: &Row) -> Note {
    Note {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        content: row.get("content"),
        category: row.get("category"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Note>, (user::Id, note::Id)>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Note>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Note>, (user::Id, note::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (owner, id) = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} FROM notes \
             WHERE id = $1::UUID AND user_id = $2::UUID",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id, &owner])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Note>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Note>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Note>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} FROM notes \
             WHERE user_id = $1::UUID \
             ORDER BY created_at DESC, id DESC",
        );
        Ok(self
            .query(sql.as_str(), &[&owner])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Note>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(note): Insert<Note>,
    ) -> Result<Self::Ok, Self::Err> {
        let Note {
            id,
            user_id,
            title,
            content,
            category,
            created_at,
            updated_at,
        } = note;

        const SQL: &str = "\
            INSERT INTO notes (\
                id, user_id, \
                title, content, category, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::TEXT, $5::VARCHAR, \
                $6::TIMESTAMPTZ, $7::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &user_id,
                &title,
                &content,
                &category,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Note>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(note): Update<Note>,
    ) -> Result<Self::Ok, Self::Err> {
        let Note {
            id,
            user_id,
            title,
            content,
            category,
            created_at: _,
            updated_at,
        } = note;

        const SQL: &str = "\
            UPDATE notes \
            SET title = $3::VARCHAR, \
                content = $4::TEXT, \
                category = $5::VARCHAR, \
                updated_at = $6::TIMESTAMPTZ \
            WHERE id = $1::UUID AND user_id = $2::UUID";
        self.exec(
            SQL,
            &[&id, &user_id, &title, &content, &category, &updated_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Note, (user::Id, note::Id)>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Note, (user::Id, note::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (owner, id) = by.into_inner();

        const SQL: &str = "\
            SELECT 1 FROM notes \
            WHERE id = $1::UUID AND user_id = $2::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id, &owner])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Option<Note>, (user::Id, note::Id)>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Note>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Option<Note>, (user::Id, note::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (owner, id) = by.into_inner();

        let sql = format!(
            "DELETE FROM notes \
             WHERE id = $1::UUID AND user_id = $2::UUID \
             RETURNING {COLUMNS}",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id, &owner])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}
