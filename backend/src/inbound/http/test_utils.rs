//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};

use crate::domain::fakes::{BoardExecutor, InMemoryStaging, InMemoryValidations, StatusBoard};
use crate::domain::ports::{
    FixtureCatalogRepository, FixtureProcedureExecutor, FixtureStagingRepository,
    FixtureUnitStatusRepository, FixtureValidationRepository, FixtureWorkflowLock,
};
use crate::domain::{FormKind, PeriodRef, PortalSettings};
use crate::inbound::http::capture::form_scope;
use crate::inbound::http::session::{
    GIVEN_NAME_COOKIE, LEVEL_ID_COOKIE, LOGIN_COOKIE, MATERNAL_NAME_COOKIE, PATERNAL_NAME_COOKIE,
    ROLE_ID_COOKIE, ROLE_NAME_COOKIE, UNIT_ID_COOKIE, USER_ID_COOKIE,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Capturist role id.
pub const CAPTURIST: i32 = 3;
/// A reviewer role id.
pub const REVIEWER: i32 = 5;
/// A role with no capability.
pub const VISITOR: i32 = 1;

/// Settings defaulting to the fixture period.
pub fn settings() -> PortalSettings {
    PortalSettings::new(PeriodRef::new(7, "2025-2026/1"))
}

/// State wired entirely to fixture ports.
pub fn fixture_state() -> HttpState {
    HttpState::new(
        HttpStatePorts {
            catalog: Arc::new(FixtureCatalogRepository),
            executor: Arc::new(FixtureProcedureExecutor),
            staging: Arc::new(FixtureStagingRepository),
            unit_status: Arc::new(FixtureUnitStatusRepository),
            validations: Arc::new(FixtureValidationRepository),
            lock: Arc::new(FixtureWorkflowLock),
        },
        settings(),
    )
}

/// Fixture catalog over in-memory staging, lights and reviewer records.
pub struct Workbench {
    /// Staging tables.
    pub staging: Arc<InMemoryStaging>,
    /// Unit and semester lights.
    pub board: Arc<StatusBoard>,
    /// Procedure recorder.
    pub executor: Arc<BoardExecutor>,
    /// Reviewer decisions.
    pub validations: Arc<InMemoryValidations>,
}

impl Workbench {
    /// Unit in capture with the given semester lights.
    pub fn new(semesters: &[(&str, i64)]) -> Self {
        let board = StatusBoard::new(Some(2), semesters);
        Self {
            staging: Arc::new(InMemoryStaging::default()),
            executor: Arc::new(BoardExecutor::new(board.clone())),
            board,
            validations: Arc::new(InMemoryValidations::default()),
        }
    }

    /// State sharing this bench's fakes.
    pub fn state(&self) -> HttpState {
        HttpState::new(
            HttpStatePorts {
                catalog: Arc::new(FixtureCatalogRepository),
                executor: self.executor.clone(),
                staging: self.staging.clone(),
                unit_status: self.board.clone(),
                validations: self.validations.clone(),
                lock: Arc::new(FixtureWorkflowLock),
            },
            settings(),
        )
    }
}

/// Service with both form scopes mounted over `state`.
pub async fn init_app(
    state: HttpState,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let mut app = App::new().app_data(web::Data::new(state));
    for form in FormKind::ALL {
        app = app.service(form_scope(form));
    }
    test::init_service(app).await
}

/// Attach the identity cookies of a fixture user holding `role_id`.
pub fn with_session(request: test::TestRequest, role_id: i32) -> test::TestRequest {
    let role_name = match role_id {
        CAPTURIST => "Capturista",
        REVIEWER => "Validador",
        _ => "Consulta",
    };
    let role = role_id.to_string();
    [
        (UNIT_ID_COOKIE, "1"),
        (LEVEL_ID_COOKIE, "1"),
        (ROLE_ID_COOKIE, role.as_str()),
        (ROLE_NAME_COOKIE, role_name),
        (USER_ID_COOKIE, "42"),
        (LOGIN_COOKIE, "alopez"),
        (GIVEN_NAME_COOKIE, "Ana"),
        (PATERNAL_NAME_COOKIE, "López"),
        (MATERNAL_NAME_COOKIE, "Pérez"),
    ]
    .into_iter()
    .fold(request, |request, (name, value)| {
        request.cookie(Cookie::new(name, value.to_owned()))
    })
}
