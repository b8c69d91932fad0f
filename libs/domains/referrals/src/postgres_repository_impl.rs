use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DbBackend, FromQueryResult, Statement};

use crate::error::{ReferralError, ReferralResult};
use crate::models::ReferralCode;
use crate::repository::ReferralRepository;

/// PostgreSQL implementation of ReferralRepository using SeaORM
///
/// Atomicity of `create` rests on the UNIQUE constraints: the INSERT either
/// lands or is rejected by the database, so a concurrent create for the same
/// owner can never produce a second row.
#[derive(Clone)]
pub struct PostgresReferralRepository {
    db: sea_orm::DatabaseConnection,
}

impl PostgresReferralRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Helper struct for deserializing referral rows from the database
#[derive(Debug, FromQueryResult)]
struct ReferralRow {
    id: i64,
    code: String,
    owner_id: i64,
    expires_at: DateTime<Utc>,
}

impl From<ReferralRow> for ReferralCode {
    fn from(row: ReferralRow) -> Self {
        ReferralCode {
            id: row.id,
            code: row.code,
            owner_id: row.owner_id,
            expires_at: row.expires_at,
        }
    }
}

#[async_trait]
impl ReferralRepository for PostgresReferralRepository {
    async fn create(
        &self,
        owner_id: i64,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> ReferralResult<ReferralCode> {
        let sql = r#"
            INSERT INTO referral_codes (code, owner_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING *
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [code.into(), owner_id.into(), expires_at.into()],
        );

        let row = ReferralRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("referral_codes_code_key") {
                    ReferralError::DuplicateCode(code.to_string())
                } else if err_str.contains("duplicate key") || err_str.contains("unique constraint")
                {
                    // The owner_id UNIQUE constraint is the remaining candidate
                    ReferralError::CodeExists(owner_id)
                } else {
                    ReferralError::Internal(format!("Database error: {}", e))
                }
            })?
            .ok_or_else(|| ReferralError::Internal("Failed to create referral code".to_string()))?;

        Ok(row.into())
    }

    async fn get_by_owner(&self, owner_id: i64) -> ReferralResult<Option<ReferralCode>> {
        let sql = "SELECT * FROM referral_codes WHERE owner_id = $1";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [owner_id.into()]);

        let row = ReferralRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| ReferralError::Internal(format!("Database error: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    async fn get_by_email(&self, email: &str) -> ReferralResult<Option<ReferralCode>> {
        let sql = r#"
            SELECT rc.id, rc.code, rc.owner_id, rc.expires_at
            FROM referral_codes rc
            JOIN users u ON u.id = rc.owner_id
            WHERE u.email = $1
        "#;

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]);

        let row = ReferralRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| ReferralError::Internal(format!("Database error: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    async fn get_by_code(&self, code: &str) -> ReferralResult<Option<ReferralCode>> {
        let sql = "SELECT * FROM referral_codes WHERE code = $1";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [code.into()]);

        let row = ReferralRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| ReferralError::Internal(format!("Database error: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    async fn delete_by_owner(&self, owner_id: i64) -> ReferralResult<Option<ReferralCode>> {
        let sql = "DELETE FROM referral_codes WHERE owner_id = $1 RETURNING *";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [owner_id.into()]);

        let row = ReferralRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| ReferralError::Internal(format!("Database error: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }
}
