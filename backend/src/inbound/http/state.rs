//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on driving
//! ports, so they can be tested against mocks without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountCommand, UsersQuery};

#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UsersQuery>,
    pub accounts: Arc<dyn AccountCommand>,
}

impl HttpState {
    pub fn new(users: Arc<dyn UsersQuery>, accounts: Arc<dyn AccountCommand>) -> Self {
        Self { users, accounts }
    }
}
