use crate::api::UserId;

/// Who is looking at the page, as reported by the authentication layer
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Session {
    Unauthenticated,
    Authenticated(UserId),
}

impl Session {
    pub fn user(&self) -> Option<UserId> {
        match self {
            Session::Unauthenticated => None,
            Session::Authenticated(u) => Some(*u),
        }
    }
}
