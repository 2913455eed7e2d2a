//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod login_service;
mod user_store;
mod users_command;
mod users_query;

#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::{
    DeleteOutcome, UpdateOptions, UpdateOutcome, UserFilter, UserPatch, UserStore, UserStoreError,
};
#[cfg(test)]
pub use users_command::MockUsersCommand;
pub use users_command::{RenameOutcome, UsersCommand};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
