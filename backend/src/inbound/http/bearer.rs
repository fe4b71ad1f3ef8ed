//! Bearer credential extraction for protected handlers.
//!
//! Handlers take an [`AuthenticatedUser`] argument to require a valid
//! `Authorization: Bearer <token>` header. Verification is delegated to the
//! [`Authenticator`](crate::domain::ports::Authenticator) port held in
//! [`HttpState`].

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::{BearerToken, Error, Identity, Role};

use super::state::HttpState;

const SCHEME: &str = "bearer";

/// Identity of the caller, resolved from the bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Identity);

impl AuthenticatedUser {
    pub fn identity(&self) -> &Identity {
        &self.0
    }

    /// Fail with `403 Forbidden` unless the caller is an administrator.
    pub fn require_admin(&self) -> Result<&Identity, Error> {
        self.0.require_role(Role::Admin)?;
        Ok(&self.0)
    }
}

/// Read the credential from the `Authorization` header.
///
/// `Ok(None)` means no header was sent; a header with another scheme or no
/// token is rejected.
fn bearer_token(req: &HttpRequest) -> Result<Option<BearerToken>, Error> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("invalid token"))?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("invalid token"))?;
    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return Err(Error::unauthorized("invalid token"));
    }
    Ok(BearerToken::new(token))
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let token = bearer_token(req)?;
    state
        .auth
        .authenticate(token.as_ref())
        .map(AuthenticatedUser)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountId;
    use crate::inbound::http::test_utils::{StubAuthenticator, stub_state};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;
    use serde_json::Value;

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.identity().account_id.to_string())
    }

    async fn admin_only(user: AuthenticatedUser) -> Result<HttpResponse, Error> {
        user.require_admin()?;
        Ok(HttpResponse::NoContent().finish())
    }

    async fn call(
        auth: StubAuthenticator,
        path: &str,
        header: Option<&str>,
    ) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(stub_state(auth)))
                .route("/whoami", web::get().to(whoami))
                .route("/admin", web::get().to(admin_only)),
        )
        .await;
        let mut req = test::TestRequest::get().uri(path);
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        test::call_service(&app, req.to_request()).await
    }

    #[actix_web::test]
    async fn valid_tokens_resolve_the_identity() {
        let id = AccountId::random();
        let res = call(
            StubAuthenticator::accepting("good", id, Role::Student),
            "/whoami",
            Some("Bearer good"),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, id.to_string());
    }

    #[rstest]
    #[case::missing(None, "no token")]
    #[case::wrong_scheme(Some("Basic abc"), "invalid token")]
    #[case::no_token(Some("Bearer"), "invalid token")]
    #[case::unknown(Some("bearer other"), "invalid token")]
    #[actix_web::test]
    async fn unusable_headers_are_unauthorised(
        #[case] header: Option<&str>,
        #[case] message: &str,
    ) {
        let res = call(
            StubAuthenticator::accepting("good", AccountId::random(), Role::Student),
            "/whoami",
            header,
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], message);
    }

    #[rstest]
    #[case(Role::Student, StatusCode::FORBIDDEN)]
    #[case(Role::Admin, StatusCode::NO_CONTENT)]
    #[actix_web::test]
    async fn admin_guard_checks_the_role(#[case] role: Role, #[case] expected: StatusCode) {
        let res = call(
            StubAuthenticator::accepting("good", AccountId::random(), role),
            "/admin",
            Some("Bearer good"),
        )
        .await;
        assert_eq!(res.status(), expected);
    }
}
