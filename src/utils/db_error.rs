/// Name of the unique index guarding `short_url.full_url`.
pub const FULL_URL_UNIQUE_INDEX: &str = "short_url_full_url_key";

pub fn is_unique_violation_on_full_url(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(FULL_URL_UNIQUE_INDEX))
}
