mod admin;
mod learner;

pub use admin::{
    unauthorized_api, AdminSession, AdminUser, DbAdminSession, DbAdminUser, ADMIN_TOKEN_COOKIE,
};
pub use learner::LearnerAccess;
