//! The identity a request acts under, as carried by session cookies.

use super::Role;

const SYSTEM_USER: &str = "sistema";

/// Caller identity assembled from cookies plus the request host.
///
/// Every field defaults to zero or empty when its cookie is missing, so an
/// anonymous request yields an [`Actor`] with [`Role::Unprivileged`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    /// `id_usuario`.
    pub user_id: i32,
    /// `id_rol`.
    pub role_id: i32,
    /// `nombre_rol`.
    pub role_name: String,
    /// `usuario`: the login name.
    pub login: String,
    /// `nombre_usuario`.
    pub given_name: String,
    /// `apellidoP_usuario`.
    pub paternal_name: String,
    /// `apellidoM_usuario`.
    pub maternal_name: String,
    /// `id_unidad_academica`.
    pub unit_id: i32,
    /// `id_nivel`.
    pub level_id: i32,
    /// Client address passed to procedures as `@HHost`.
    pub host: String,
}

impl Actor {
    /// Capability derived from the role id.
    pub fn role(&self) -> Role {
        Role::from_id(self.role_id)
    }

    /// Given and family names joined by spaces, skipping empty parts.
    ///
    /// # Examples
    /// ```
    /// use captura::domain::Actor;
    ///
    /// let actor = Actor {
    ///     given_name: "Ana".into(),
    ///     maternal_name: "Pérez".into(),
    ///     ..Actor::default()
    /// };
    /// assert_eq!(actor.full_name(), "Ana Pérez");
    /// ```
    pub fn full_name(&self) -> String {
        [&self.given_name, &self.paternal_name, &self.maternal_name]
            .into_iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `@UUsuario` for capture procedures: the full name or `sistema`.
    pub fn procedure_user(&self) -> String {
        let name = self.full_name();
        if name.is_empty() {
            SYSTEM_USER.to_owned()
        } else {
            name
        }
    }

    /// `@UUsuario` for review procedures: the login or `sistema`.
    pub fn review_user(&self) -> String {
        let login = self.login.trim();
        if login.is_empty() {
            SYSTEM_USER.to_owned()
        } else {
            login.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_actor_acts_as_system() {
        let actor = Actor::default();
        assert_eq!(actor.procedure_user(), "sistema");
        assert_eq!(actor.review_user(), "sistema");
        assert_eq!(actor.role(), Role::Unprivileged);
    }

    #[test]
    fn procedure_user_joins_name_parts() {
        let actor = Actor {
            given_name: "Ana".into(),
            paternal_name: " López ".into(),
            maternal_name: "Pérez".into(),
            login: "alopez".into(),
            ..Actor::default()
        };
        assert_eq!(actor.procedure_user(), "Ana López Pérez");
        assert_eq!(actor.review_user(), "alopez");
    }
}
