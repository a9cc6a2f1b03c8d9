use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

/// The slice of an employee record the leave workflow needs.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1000,
        "employee_code": "SGC-014",
        "first_name": "Amina",
        "last_name": "Wanjiru",
        "location": "dandora",
        "hire_date": "2024-07-01"
    })
)]
pub struct Employee {
    pub id: u64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub location: String,
    #[schema(value_type = String, format = "date")]
    pub hire_date: NaiveDate,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub async fn find_active(pool: &MySqlPool, id: u64) -> Result<Option<Employee>, sqlx::Error> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, employee_code, first_name, last_name, location, hire_date
            FROM employees
            WHERE id = ? AND is_active = TRUE
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
