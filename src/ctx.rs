use std::convert::Infallible;

use axum::extract::{Extension, FromRequestParts};
use axum::http::request::Parts;
use serde::Serialize;
use uuid::{uuid, Uuid};

use crate::db::DB;

pub type UserId = Uuid;

#[derive(Clone, Debug, FromRequestParts)]
pub struct BaseParams {
    pub ctx: Ctx,
    #[from_request(via(Extension))]
    pub db: DB,
}

#[derive(Debug, Serialize, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
}

/// Per-request context. Authentication itself lives outside this service;
/// the rest of the code only consumes `user` / `get_user_id`.
#[derive(Clone, Debug)]
pub struct Ctx {
    pub user: Option<User>,
}

impl Ctx {
    pub fn get_user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // TODO: resolve the user from the session once the auth service lands
        Ok(Self {
            user: Some(User {
                id: uuid!("018f6146-32f4-7948-8289-cfb5cdb2b2af"),
                email: "fake@mail.com".into(),
            }),
        })
    }
}
