use sqlx::FromRow;

/// Credential row shared by `admin_login` and `volunteer_login`
#[derive(Debug, FromRow)]
pub struct AccountSql {
    pub id: u64,
    pub email: String,
    pub password: String,
}
