//! Seed an admin user into the configured PostgREST backend.
//!
//! Usage: `seed-admin <username> <password>` with the same
//! `SQUARES_BACK_POSTGREST_*` environment variables the server uses.

use std::env;

use anyhow::{Context, bail};
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use uuid::Uuid;

use squares_back::dao::{
    game_store::{
        GameStore,
        postgrest::{PostgrestConfig, PostgrestGameStore},
    },
    models::UserEntity,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = env::args().skip(1);
    let (Some(username), Some(password)) = (args.next(), args.next()) else {
        bail!("usage: seed-admin <username> <password>");
    };

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("hashing password: {err}"))?
        .to_string();

    let config = PostgrestConfig::from_env().context("reading PostgREST configuration")?;
    let store = PostgrestGameStore::connect(config)
        .await
        .context("connecting to PostgREST")?;

    let user = UserEntity {
        id: Uuid::new_v4(),
        username: username.clone(),
        password_hash,
        is_admin: true,
    };
    store.insert_user(user).await.context("inserting user")?;

    println!("admin user '{username}' created");
    Ok(())
}
