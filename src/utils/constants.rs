/// Clave de localStorage con la sesión serializada (token + perfil)
pub const SESSION_STORAGE_KEY: &str = "torre_user";

/// Clave de localStorage con el tag de la versión cuyo aviso fue descartado
pub const UPDATE_DISMISSED_STORAGE_KEY: &str = "torre_update_dismissed";

/// Clave de localStorage con el orden de la tabla de motoristas
pub const SLA_SORT_STORAGE_KEY: &str = "sla_sort";

/// Clave de localStorage con la base del filtro por columna
pub const SLA_BASE_FILTER_STORAGE_KEY: &str = "sla_base_filter";

/// Ruta de entrada al login
pub const LOGIN_ROUTE: &str = "/login";

/// Etiqueta para motoristas sin base de entrega
pub const NO_BASE_LABEL: &str = "(sem base)";
