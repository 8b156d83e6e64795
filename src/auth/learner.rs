use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use std::collections::HashSet;

/// Per-request unlock state for a learner: the set of module ids this
/// browser session has unlocked with the owning program's password.
///
/// Each module is tracked individually. Unlocking one module does not unlock
/// its siblings, even though every module of a program shares the same
/// secret; the learner enters it once per module.
///
/// Independent of the admin gate; the two share no state.
#[derive(Debug, Default, Clone)]
pub struct LearnerAccess {
    unlocked_modules: HashSet<i64>,
}

impl LearnerAccess {
    pub const COOKIE_NAME: &'static str = "unlocked_modules";

    pub fn from_cookie_value(value: Option<&str>) -> Self {
        let unlocked_modules = value
            .unwrap_or_default()
            .split(',')
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect();

        Self { unlocked_modules }
    }

    pub fn cookie_value(&self) -> String {
        let mut ids: Vec<i64> = self.unlocked_modules.iter().copied().collect();
        ids.sort_unstable();
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn is_unlocked(&self, module_id: i64) -> bool {
        self.unlocked_modules.contains(&module_id)
    }

    pub fn unlock(&mut self, module_id: i64) {
        self.unlocked_modules.insert(module_id);
    }

    /// Persists the unlock set back onto the learner's session cookie.
    pub fn store(&self, cookies: &CookieJar<'_>) {
        cookies.add_private(
            Cookie::build((Self::COOKIE_NAME, self.cookie_value()))
                .same_site(SameSite::Lax)
                .http_only(true),
        );
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for LearnerAccess {
    type Error = ();

    // Always succeeds: an absent cookie is simply an empty unlock set.
    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let value = request
            .cookies()
            .get_private(Self::COOKIE_NAME)
            .map(|c| c.value().to_string());

        Outcome::Success(Self::from_cookie_value(value.as_deref()))
    }
}
