//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. `diesel print-schema`
//! against a migrated database regenerates them.

diesel::table! {
    /// Academic periods.
    cat_periodo (id_periodo) {
        id_periodo -> Int4,
        /// Literal label, e.g. `2025-2026/1`.
        periodo -> Varchar,
    }
}

diesel::table! {
    /// Academic units.
    cat_unidad_academica (id_unidad_academica) {
        id_unidad_academica -> Int4,
        /// Short code passed to procedures.
        sigla -> Varchar,
        nombre -> Varchar,
    }
}

diesel::table! {
    cat_nivel (id_nivel) {
        id_nivel -> Int4,
        nivel -> Varchar,
    }
}

diesel::table! {
    cat_rama (id_rama) {
        id_rama -> Int4,
        nombre_rama -> Varchar,
    }
}

diesel::table! {
    /// Programs; the branch is optional.
    cat_programa (id_programa) {
        id_programa -> Int4,
        nombre_programa -> Varchar,
        id_rama -> Nullable<Int4>,
        id_nivel -> Int4,
    }
}

diesel::table! {
    cat_modalidad (id_modalidad) {
        id_modalidad -> Int4,
        modalidad -> Varchar,
    }
}

diesel::table! {
    cat_semestre (id_semestre) {
        id_semestre -> Int4,
        semestre -> Varchar,
    }
}

diesel::table! {
    cat_turno (id_turno) {
        id_turno -> Int4,
        turno -> Varchar,
    }
}

diesel::table! {
    cat_grupo_edad (id_grupo_edad) {
        id_grupo_edad -> Int4,
        grupo_edad -> Varchar,
    }
}

diesel::table! {
    cat_tipo_ingreso (id_tipo_ingreso) {
        id_tipo_ingreso -> Int4,
        tipo_de_ingreso -> Varchar,
    }
}

diesel::table! {
    cat_aprovechamiento (id_aprovechamiento) {
        id_aprovechamiento -> Int4,
        aprovechamiento -> Varchar,
    }
}

diesel::table! {
    /// Status light definitions.
    cat_semaforo (id_semaforo) {
        id_semaforo -> Int4,
        descripcion -> Varchar,
        color -> Varchar,
    }
}

diesel::table! {
    /// Portal users, read for reviewer display names.
    usuario (id_usuario) {
        id_usuario -> Int4,
        #[sql_name = "usuario"]
        login -> Varchar,
        nombre -> Varchar,
        apellido_paterno -> Varchar,
        apellido_materno -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Enrollment staging rows, unique per natural key.
    temp_matricula (id) {
        id -> Int8,
        periodo -> Varchar,
        sigla -> Varchar,
        nombre_programa -> Varchar,
        nombre_rama -> Varchar,
        nivel -> Varchar,
        modalidad -> Varchar,
        turno -> Varchar,
        semestre -> Varchar,
        grupo_edad -> Varchar,
        tipo_ingreso -> Varchar,
        sexo -> Varchar,
        matricula -> Int4,
        salones -> Nullable<Int4>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Performance staging rows, unique per natural key.
    temp_aprovechamiento (id) {
        id -> Int8,
        periodo -> Varchar,
        sigla -> Varchar,
        nombre_programa -> Varchar,
        nombre_rama -> Varchar,
        nivel -> Varchar,
        modalidad -> Varchar,
        turno -> Varchar,
        semestre -> Varchar,
        aprovechamiento -> Varchar,
        sexo -> Varchar,
        cantidad -> Int4,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Aggregate status light per unit, period and form.
    semaforo_unidad_academica (id_periodo, id_unidad_academica, id_formato) {
        id_periodo -> Int4,
        id_unidad_academica -> Int4,
        id_formato -> Int4,
        id_semaforo -> Int4,
    }
}

diesel::table! {
    /// Reviewer decisions, one per period, reviewer and form.
    validacion (id) {
        id -> Int8,
        id_periodo -> Int4,
        id_usuario -> Int4,
        id_formato -> Int4,
        validado -> Bool,
        nota -> Nullable<Text>,
        fecha -> Timestamptz,
    }
}

diesel::joinable!(cat_programa -> cat_rama (id_rama));

diesel::allow_tables_to_appear_in_same_query!(cat_programa, cat_rama);
