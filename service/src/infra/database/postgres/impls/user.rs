//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `users` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, username, email, password_hash, created_at, updated_at";

/// Reads a [`User`] from the provided [`Row`] selected with [`COLUMNS`].
fn from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1::UUID");
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Login>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let row = match by.into_inner() {
            user::Login::Username(name) => {
                let sql = format!(
                    "SELECT {COLUMNS} FROM users \
                     WHERE username = $1::VARCHAR",
                );
                self.query_opt(sql.as_str(), &[name]).await
            }
            user::Login::Email(email) => {
                let sql = format!(
                    "SELECT {COLUMNS} FROM users WHERE email = $1::VARCHAR",
                );
                self.query_opt(sql.as_str(), &[email]).await
            }
        }
        .map_err(tracerr::wrap!())?;

        Ok(row.as_ref().map(from_row))
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            username,
            email,
            password_hash,
            created_at,
            updated_at,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (\
                id, username, email, password_hash, created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, \
                $4::VARCHAR, \
                $5::TIMESTAMPTZ, $6::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &username,
                &email,
                &password_hash,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
