pub mod client;
pub mod session;

pub use client::{
    login_outcome, AdminClient, AdminError, KeyGrant, VoterCard, LOGIN_OK,
    LOGIN_UNKNOWN_ACCOUNT, LOGIN_WRONG_PASSWORD,
};
pub use session::{clear_session, load_session, save_session, AdminSession, SessionError};
