//! Session identity read from the portal's plain cookies.
//!
//! The login module upstream sets one cookie per identity field. Handlers take
//! an [`Actor`] argument and never touch cookies directly. A missing or
//! unparsable cookie yields zero or an empty string, never a rejection; role
//! checks happen in the domain.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload};

use crate::domain::Actor;

pub(crate) const UNIT_ID_COOKIE: &str = "id_unidad_academica";
pub(crate) const LEVEL_ID_COOKIE: &str = "id_nivel";
pub(crate) const ROLE_ID_COOKIE: &str = "id_rol";
pub(crate) const ROLE_NAME_COOKIE: &str = "nombre_rol";
pub(crate) const USER_ID_COOKIE: &str = "id_usuario";
pub(crate) const LOGIN_COOKIE: &str = "usuario";
pub(crate) const GIVEN_NAME_COOKIE: &str = "nombre_usuario";
pub(crate) const PATERNAL_NAME_COOKIE: &str = "apellidoP_usuario";
pub(crate) const MATERNAL_NAME_COOKIE: &str = "apellidoM_usuario";

const UNKNOWN_HOST: &str = "unknown";

fn cookie_text(req: &HttpRequest, name: &str) -> String {
    req.cookie(name)
        .map(|cookie| cookie.value().to_owned())
        .unwrap_or_default()
}

fn cookie_id(req: &HttpRequest, name: &str) -> i32 {
    req.cookie(name)
        .and_then(|cookie| cookie.value().trim().parse().ok())
        .unwrap_or_default()
}

/// Client address for `@HHost`: the forwarded address when present, else
/// the peer address.
fn request_host(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .map(|addr| {
            // Strip the port from `ip:port` but keep bare IPv6 addresses.
            match addr.rsplit_once(':') {
                Some((ip, port))
                    if !ip.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) =>
                {
                    ip.to_owned()
                }
                _ => addr.to_owned(),
            }
        })
        .unwrap_or_else(|| UNKNOWN_HOST.to_owned())
}

/// Assemble the caller identity from the request cookies.
pub fn actor_from_request(req: &HttpRequest) -> Actor {
    Actor {
        user_id: cookie_id(req, USER_ID_COOKIE),
        role_id: cookie_id(req, ROLE_ID_COOKIE),
        role_name: cookie_text(req, ROLE_NAME_COOKIE),
        login: cookie_text(req, LOGIN_COOKIE),
        given_name: cookie_text(req, GIVEN_NAME_COOKIE),
        paternal_name: cookie_text(req, PATERNAL_NAME_COOKIE),
        maternal_name: cookie_text(req, MATERNAL_NAME_COOKIE),
        unit_id: cookie_id(req, UNIT_ID_COOKIE),
        level_id: cookie_id(req, LEVEL_ID_COOKIE),
        host: request_host(req),
    }
}

impl FromRequest for Actor {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(actor_from_request(req)))
    }
}
